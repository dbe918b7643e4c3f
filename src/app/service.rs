//! Sync engine — the registration/state-synchronization protocol core.
//!
//! [`SyncEngine`] owns the entity registry and drives the handshake with
//! the supervisor: every declared entity must be registered (acknowledged
//! on the response topic) before any state update for it is published.
//! Until then, publish attempts and the periodic tick re-send the
//! registration request, paced by the configured resend interval.
//!
//! ```text
//!  executor commands ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                        │        SyncEngine          │
//!  broker messages  ──▶  │  EntityRegistry · TopicSet │ ──▶ TransportPort
//!                        └───────────────────────────┘
//! ```
//!
//! Time never comes from a global clock: every operation takes `now_ms`
//! from the caller's clock adapter, which keeps retry pacing fully
//! deterministic under test.

use log::{info, warn};

use crate::config::DeviceConfig;
use crate::entity::{Entity, EntityKind, StateValue};
use crate::registry::{AckOutcome, EntityRegistry};
use crate::topics::{InboundTopic, TopicSet};
use crate::wire::{ActionCommand, RegisterAck};

use super::commands::DeviceCommand;
use super::events::AppEvent;
use super::ports::{EventSink, TransportPort};

// ───────────────────────────────────────────────────────────────
// SyncEngine
// ───────────────────────────────────────────────────────────────

/// The protocol state machine. Constructed once and owned by whatever
/// drives the transport pump; all I/O flows through the port parameters.
pub struct SyncEngine {
    registry: EntityRegistry,
    topics: TopicSet,
    resend_interval_ms: u64,
    /// Last observed link state; `None` until the first tick.
    link_up: Option<bool>,
    tick_count: u64,
    registers_sent: u64,
    updates_sent: u64,
}

impl SyncEngine {
    /// Construct the engine from configuration.
    ///
    /// Does **not** subscribe — call [`start`](Self::start) once the
    /// transport session exists.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            registry: EntityRegistry::new(config.max_entities, config.redeclare_policy),
            topics: TopicSet::for_device(&config.device_id),
            resend_interval_ms: config.register_resend_ms,
            link_up: None,
            tick_count: 0,
            registers_sent: 0,
            updates_sent: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Subscribe to the response and action topics.
    pub fn start(&mut self, transport: &mut impl TransportPort, sink: &mut impl EventSink) {
        let response_ok = transport.subscribe(self.topics.response());
        let action_ok = transport.subscribe(self.topics.action());
        if !(response_ok && action_ok) {
            sink.emit(&AppEvent::warning(
                "subscribe failed; supervisor messages may not arrive",
            ));
        }
        info!("sync engine ready for device '{}'", self.topics.device_id());
    }

    // ── Upstream command surface ──────────────────────────────

    /// Process one command from the executor channel.
    pub fn handle_command(
        &mut self,
        cmd: DeviceCommand,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            DeviceCommand::AddActuator { name, level } => {
                match self.registry.declare_actuator(&name, level) {
                    Ok(()) => info!("declared actuator '{}' (level {})", name, level),
                    Err(e) => {
                        sink.emit(&AppEvent::error(format!("declare actuator '{name}': {e}")));
                    }
                }
            }
            DeviceCommand::AddSensor { name, data_type } => {
                match self.registry.declare_sensor(&name, data_type) {
                    Ok(()) => info!("declared sensor '{}' ({})", name, data_type),
                    Err(e) => {
                        sink.emit(&AppEvent::error(format!("declare sensor '{name}': {e}")));
                    }
                }
            }
            DeviceCommand::PublishState { name, value } => {
                self.publish_state(&name, value, now_ms, transport, sink);
            }
            DeviceCommand::QueryConnection => {
                sink.emit(&AppEvent::ConnectionStatus {
                    connected: transport.connected(),
                });
            }
        }
    }

    /// Report a new state for `name`.
    ///
    /// While the entity is unregistered the update is suppressed and the
    /// call doubles as a registration retry, subject to the resend
    /// interval. Once registered, the state is stored and published
    /// fire-and-forget: a down transport drops the message without
    /// requeueing it.
    pub fn publish_state(
        &mut self,
        name: &str,
        value: StateValue,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let registered = match self.registry.get(name) {
            None => {
                sink.emit(&AppEvent::info(format!(
                    "state update for undeclared entity '{name}' ignored"
                )));
                return;
            }
            Some(entity) => entity.registered(),
        };

        if !registered {
            let interval = self.resend_interval_ms;
            if let Some(entity) = self.registry.get_mut(name) {
                if publish_register(&self.topics, entity, now_ms, interval, transport) {
                    self.registers_sent += 1;
                }
            }
            return;
        }

        if let Err(e) = self.registry.set_state(name, value) {
            sink.emit(&AppEvent::error(format!("state update for '{name}': {e}")));
            return;
        }
        let Some(entity) = self.registry.get(name) else {
            return;
        };
        if !transport.connected() {
            return;
        }
        let Ok(payload) = serde_json::to_vec(&entity.state_update()) else {
            return;
        };
        if transport.publish(self.topics.update(), &payload) {
            self.updates_sent += 1;
        }
    }

    // ── Periodic tick ─────────────────────────────────────────

    /// One pass of the cooperative loop: watch the link for edges, then
    /// re-send registration requests for every unregistered entity whose
    /// resend interval has elapsed.
    pub fn tick(
        &mut self,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let connected = transport.connected();
        match self.link_up {
            Some(false) if connected => {
                // The broker may have restarted and forgotten us, so every
                // entity goes back through the registration handshake.
                self.registry.reset_registrations();
                sink.emit(&AppEvent::info("link restored; re-announcing all entities"));
                info!("transport reconnected, {} entities to re-register", self.registry.len());
            }
            Some(true) if !connected => {
                sink.emit(&AppEvent::warning("link lost; publishing suspended"));
                warn!("transport disconnected");
            }
            _ => {}
        }
        self.link_up = Some(connected);

        if !connected {
            return;
        }
        let interval = self.resend_interval_ms;
        for entity in self.registry.iter_mut() {
            if entity.registered() {
                continue;
            }
            if publish_register(&self.topics, entity, now_ms, interval, transport) {
                self.registers_sent += 1;
            }
        }
    }

    // ── Inbound message routing ───────────────────────────────

    /// Route one inbound broker message by topic. Invoked synchronously
    /// from the transport pump.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8], sink: &mut impl EventSink) {
        match self.topics.classify(topic) {
            InboundTopic::Response => self.on_register_ack(payload, sink),
            InboundTopic::Action => self.on_action(payload, sink),
            InboundTopic::Other => {
                sink.emit(&AppEvent::warning(format!(
                    "message on unexpected topic '{topic}'"
                )));
            }
        }
    }

    fn on_register_ack(&mut self, payload: &[u8], sink: &mut impl EventSink) {
        let ack: RegisterAck = match serde_json::from_slice(payload) {
            Ok(ack) => ack,
            Err(e) => {
                sink.emit(&AppEvent::error(format!("failed to parse registration ack: {e}")));
                return;
            }
        };
        match self.registry.mark_registered(&ack.name) {
            AckOutcome::Registered(kind) => {
                sink.emit(&AppEvent::info(format!("{kind} '{}' registered", ack.name)));
                sink.emit(&AppEvent::EntityRegistered {
                    name: ack.name,
                    kind,
                });
            }
            // Duplicate acks are expected while the resend timer and the
            // supervisor race; they are silent no-ops.
            AckOutcome::AlreadyRegistered => {}
            AckOutcome::Unknown => {
                sink.emit(&AppEvent::info(format!(
                    "ack for unknown entity '{}' ignored",
                    ack.name
                )));
            }
        }
    }

    fn on_action(&mut self, payload: &[u8], sink: &mut impl EventSink) {
        let cmd: ActionCommand = match serde_json::from_slice(payload) {
            Ok(cmd) => cmd,
            Err(e) => {
                sink.emit(&AppEvent::error(format!("failed to parse action command: {e}")));
                return;
            }
        };
        match self.registry.get(&cmd.name) {
            Some(entity) if entity.kind() == EntityKind::Actuator && entity.registered() => {
                sink.emit(&AppEvent::ActuatorCommand {
                    name: cmd.name,
                    value: cmd.state,
                });
            }
            // Unknown, sensor-typed, or not-yet-registered targets drop the
            // command: no buffering, no NACK to the broker.
            _ => {
                log::debug!("action for '{}' dropped", cmd.name);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Registration requests actually published.
    pub fn registers_sent(&self) -> u64 {
        self.registers_sent
    }

    /// State updates actually published.
    pub fn updates_sent(&self) -> u64 {
        self.updates_sent
    }
}

// ───────────────────────────────────────────────────────────────
// Internal
// ───────────────────────────────────────────────────────────────

/// Publish a registration request for `entity` if the transport is up and
/// the resend interval has elapsed. Returns whether a request went out;
/// `last_register_ms` is stamped only in that case.
fn publish_register(
    topics: &TopicSet,
    entity: &mut Entity,
    now_ms: u64,
    resend_interval_ms: u64,
    transport: &mut impl TransportPort,
) -> bool {
    if !transport.connected() {
        return false;
    }
    if !entity.register_due(now_ms, resend_interval_ms) {
        return false;
    }
    let Ok(payload) = serde_json::to_vec(&entity.register_request()) else {
        return false;
    };
    transport.publish(topics.register(), &payload);
    entity.note_register_sent(now_ms);
    true
}
