//! Outbound application events.
//!
//! The [`SyncEngine`](super::service::SyncEngine) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — forward to the executor over serial,
//! write to the process log, or record in a test.

use core::fmt;

use crate::entity::EntityKind;

/// Log-event severity, spelled the way it crosses the executor link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured events emitted by the protocol core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A protocol-level log line for the host.
    Log { severity: Severity, message: String },

    /// The supervisor acknowledged an entity for the first time.
    EntityRegistered { name: String, kind: EntityKind },

    /// A registered actuator received a command from the supervisor.
    ActuatorCommand { name: String, value: i32 },

    /// Answer to a connection query.
    ConnectionStatus { connected: bool },
}

impl AppEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Log {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Log {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Log {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
