//! Entity records — the device-side model of one actuator or sensor.
//!
//! An [`Entity`] carries its declared capability, its last-known state, and
//! the registration bookkeeping the sync protocol needs: whether the
//! supervisor has acknowledged the entity yet, and when the last
//! registration request went out on the wire.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::wire::{RegisterRequest, StateUpdate};

// ───────────────────────────────────────────────────────────────
// Kinds and typed values
// ───────────────────────────────────────────────────────────────

/// The two entity kinds. A name belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Actuator,
    Sensor,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actuator => "actuator",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared value type of a sensor, fixed at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorDataType {
    Boolean,
    Integer,
    Float,
    String,
}

impl SensorDataType {
    /// Parse the wire spelling. Anything else is an unsupported type.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

impl fmt::Display for SensorDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state value offered by the upstream command channel.
///
/// Actuators hold integers, sensors hold string-encoded values; the
/// registry rejects a mismatch before anything reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Integer(i32),
    Text(String),
}

// ───────────────────────────────────────────────────────────────
// Entity
// ───────────────────────────────────────────────────────────────

/// Kind-specific capability and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityProfile {
    Actuator {
        /// Declared capability level, immutable after creation.
        level: u16,
        /// Last commanded/reported value.
        state: i32,
    },
    Sensor {
        /// Declared value type, immutable after creation.
        data_type: SensorDataType,
        /// Last reported value, string-encoded.
        state: String,
    },
}

/// One declared actuator or sensor, owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    name: String,
    profile: EntityProfile,
    registered: bool,
    /// Timestamp of the most recent registration publish. `None` until the
    /// first one goes out, so the first attempt fires immediately.
    last_register_ms: Option<u64>,
}

impl Entity {
    pub(crate) fn new_actuator(name: impl Into<String>, level: u16) -> Self {
        Self {
            name: name.into(),
            profile: EntityProfile::Actuator { level, state: 0 },
            registered: false,
            last_register_ms: None,
        }
    }

    pub(crate) fn new_sensor(name: impl Into<String>, data_type: SensorDataType) -> Self {
        Self {
            name: name.into(),
            profile: EntityProfile::Sensor {
                data_type,
                state: String::new(),
            },
            registered: false,
            last_register_ms: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        match self.profile {
            EntityProfile::Actuator { .. } => EntityKind::Actuator,
            EntityProfile::Sensor { .. } => EntityKind::Sensor,
        }
    }

    pub fn profile(&self) -> &EntityProfile {
        &self.profile
    }

    /// Whether the supervisor has acknowledged this entity.
    pub fn registered(&self) -> bool {
        self.registered
    }

    pub(crate) fn mark_registered(&mut self) {
        self.registered = true;
    }

    /// Clear the registration handshake so the retry path re-announces.
    pub(crate) fn clear_registration(&mut self) {
        self.registered = false;
        self.last_register_ms = None;
    }

    /// Whether a registration publish is due at `now_ms`.
    ///
    /// Due when no request has ever been sent, or when at least
    /// `resend_interval_ms` has elapsed since the last one.
    pub fn register_due(&self, now_ms: u64, resend_interval_ms: u64) -> bool {
        match self.last_register_ms {
            None => true,
            Some(sent) => now_ms.saturating_sub(sent) >= resend_interval_ms,
        }
    }

    /// Record that a registration request actually went out. Skipped
    /// attempts must not call this.
    pub(crate) fn note_register_sent(&mut self, now_ms: u64) {
        self.last_register_ms = Some(now_ms);
    }

    /// Write a new state value, rejecting kind mismatches.
    pub(crate) fn apply_state(&mut self, value: StateValue) -> Result<(), StateError> {
        match (&mut self.profile, value) {
            (EntityProfile::Actuator { state, .. }, StateValue::Integer(v)) => {
                *state = v;
                Ok(())
            }
            (EntityProfile::Sensor { state, .. }, StateValue::Text(v)) => {
                *state = v;
                Ok(())
            }
            _ => Err(StateError::KindMismatch),
        }
    }

    /// Build the registration request for this entity.
    pub fn register_request(&self) -> RegisterRequest<'_> {
        match &self.profile {
            EntityProfile::Actuator { level, .. } => RegisterRequest::Actuator {
                name: &self.name,
                level: *level,
            },
            EntityProfile::Sensor { data_type, .. } => RegisterRequest::Sensor {
                name: &self.name,
                data_type: *data_type,
            },
        }
    }

    /// Build the state-update message carrying the last-known state.
    pub fn state_update(&self) -> StateUpdate<'_> {
        match &self.profile {
            EntityProfile::Actuator { state, .. } => StateUpdate::Actuator {
                name: &self.name,
                state: *state,
            },
            EntityProfile::Sensor { state, .. } => StateUpdate::Sensor {
                name: &self.name,
                state,
            },
        }
    }
}
