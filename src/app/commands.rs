//! Inbound commands to the sync engine.
//!
//! These represent the upstream command surface — requests arriving from
//! the executor's serial channel that the
//! [`SyncEngine`](super::service::SyncEngine) interprets and acts upon.

use crate::entity::{SensorDataType, StateValue};

/// Commands that the upstream channel can send into the protocol core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Declare an actuator with its capability level.
    AddActuator { name: String, level: u16 },

    /// Declare a sensor with its value type.
    AddSensor {
        name: String,
        data_type: SensorDataType,
    },

    /// Report a new state for a declared entity. Suppressed (and turned
    /// into a registration retry) while the entity is unregistered.
    PublishState { name: String, value: StateValue },

    /// Ask for the current broker connection status.
    QueryConnection,
}
