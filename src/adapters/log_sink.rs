//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the process logger. A serial adapter forwarding the same events to the
//! executor implements the same trait.

use log::{error, info, warn};

use crate::app::events::{AppEvent, Severity};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Log { severity, message } => match severity {
                Severity::Info => info!("LOG | {}", message),
                Severity::Warning => warn!("LOG | {}", message),
                Severity::Error => error!("LOG | {}", message),
            },
            AppEvent::EntityRegistered { name, kind } => {
                info!("REG | {} '{}' acknowledged", kind, name);
            }
            AppEvent::ActuatorCommand { name, value } => {
                info!("ACT | '{}' -> {}", name, value);
            }
            AppEvent::ConnectionStatus { connected } => {
                info!("LINK | connected={}", connected);
            }
        }
    }
}
