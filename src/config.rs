//! Device configuration parameters
//!
//! All tunable parameters for the HomeLink client. Values are normally
//! baked at provisioning time and handed to the engine once at startup.

use serde::{Deserialize, Serialize};

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier, templated into every topic name
    pub device_id: String,

    // --- Registration protocol ---
    /// Minimum gap between registration publishes for one entity (milliseconds)
    pub register_resend_ms: u64,
    /// Fixed budget of declarable entities (actuators + sensors combined)
    pub max_entities: usize,
    /// What a repeated declaration of a known name does
    pub redeclare_policy: RedeclarePolicy,
}

/// Behaviour when an entity name is declared again under the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedeclarePolicy {
    /// Re-create the entity: registration status and state are lost and the
    /// registration handshake starts over.
    #[default]
    Reset,
    /// Keep registration status and state when the declared capability is
    /// unchanged; fall back to `Reset` when it changed.
    Preserve,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: String::from("HOMELINK-0001"),
            register_resend_ms: 500,
            max_entities: 32,
            redeclare_policy: RedeclarePolicy::default(),
        }
    }
}
