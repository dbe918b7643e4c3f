//! Broker-facing JSON message shapes.
//!
//! These structs are the wire contract with the supervisor, used verbatim
//! at the transport boundary:
//!
//! ```text
//! register  {"type":"actuator","name":"fan","level":3}
//!           {"type":"sensor","name":"temp1","data_type":"float"}
//! update    {"type":"actuator","name":"fan","state":2}
//!           {"type":"sensor","name":"temp1","state":"21.5"}
//! response  {"name":"fan"}                   (inbound ack)
//! action    {"name":"fan","state":2}         (inbound command)
//! ```
//!
//! Outbound types borrow from the owning [`Entity`](crate::entity::Entity)
//! so message building never clones. Inbound types own their fields and
//! ignore extra keys the supervisor may attach.

use serde::{Deserialize, Serialize};

use crate::entity::SensorDataType;

/// Registration request, published until the supervisor acknowledges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegisterRequest<'a> {
    Actuator { name: &'a str, level: u16 },
    Sensor {
        name: &'a str,
        data_type: SensorDataType,
    },
}

/// State update for a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StateUpdate<'a> {
    Actuator { name: &'a str, state: i32 },
    Sensor { name: &'a str, state: &'a str },
}

/// Registration acknowledgment from the supervisor.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAck {
    pub name: String,
}

/// Actuator command from the supervisor.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionCommand {
    pub name: String,
    pub state: i32,
}
