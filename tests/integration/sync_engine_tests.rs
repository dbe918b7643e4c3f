//! Integration tests for the registration/sync protocol engine.
//!
//! These drive the full protocol surface — declarations, state publishes,
//! retry ticks, inbound acks and action commands — against mock adapters
//! and assert on the complete publish/event history.

use crate::mock_link::{EventRecorder, MockTransport};

use homelink::app::commands::DeviceCommand;
use homelink::app::events::{AppEvent, Severity};
use homelink::app::service::SyncEngine;
use homelink::config::DeviceConfig;
use homelink::entity::{SensorDataType, StateValue};

const RESPONSE: &str = "devices/HOMELINK-0001/response";
const ACTION: &str = "devices/HOMELINK-0001/action";

fn make_engine() -> (SyncEngine, MockTransport, EventRecorder) {
    let config = DeviceConfig::default();
    let mut engine = SyncEngine::new(&config);
    let mut transport = MockTransport::new();
    let mut sink = EventRecorder::new();
    engine.start(&mut transport, &mut sink);
    (engine, transport, sink)
}

fn add_sensor(engine: &mut SyncEngine, tx: &mut MockTransport, sink: &mut EventRecorder, name: &str) {
    engine.handle_command(
        DeviceCommand::AddSensor {
            name: name.into(),
            data_type: SensorDataType::Float,
        },
        0,
        tx,
        sink,
    );
}

fn add_actuator(
    engine: &mut SyncEngine,
    tx: &mut MockTransport,
    sink: &mut EventRecorder,
    name: &str,
    level: u16,
) {
    engine.handle_command(
        DeviceCommand::AddActuator {
            name: name.into(),
            level,
        },
        0,
        tx,
        sink,
    );
}

// ── Subscriptions ────────────────────────────────────────────

#[test]
fn start_subscribes_to_response_and_action_topics() {
    let (_, transport, _) = make_engine();
    assert_eq!(transport.subscriptions, vec![RESPONSE, ACTION]);
}

// ── Registration handshake ───────────────────────────────────

#[test]
fn entity_is_unregistered_until_matching_ack_and_further_acks_are_noops() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    assert!(!engine.registry().get("temp1").unwrap().registered());

    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);
    assert!(engine.registry().get("temp1").unwrap().registered());
    assert_eq!(sink.registered_names(), vec!["temp1"]);

    // duplicate acks change nothing and emit nothing
    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);
    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);
    assert_eq!(sink.registered_names(), vec!["temp1"]);
}

#[test]
fn no_update_publish_while_unregistered() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    for now in [0, 600, 1200] {
        engine.publish_state("temp1", StateValue::Text("20.0".into()), now, &mut tx, &mut sink);
    }

    assert_eq!(tx.update_count(), 0, "registration gate must hold");
    assert_eq!(tx.register_count(), 3, "every gated publish becomes a register retry");
}

#[test]
fn register_retries_collapse_below_the_resend_interval() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);

    // sub-interval hammering: only the first attempt goes out
    for now in [0, 100, 250, 499] {
        engine.publish_state("fan", StateValue::Integer(1), now, &mut tx, &mut sink);
    }
    assert_eq!(tx.register_count(), 1);

    // spaced at the interval: one publish per call
    for now in [500, 1000, 1500] {
        engine.publish_state("fan", StateValue::Integer(1), now, &mut tx, &mut sink);
    }
    assert_eq!(tx.register_count(), 4);
}

#[test]
fn tick_resends_registration_for_every_overdue_entity() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    engine.tick(0, &mut tx, &mut sink);
    assert_eq!(tx.register_count(), 2, "first attempts fire immediately");

    engine.tick(200, &mut tx, &mut sink);
    assert_eq!(tx.register_count(), 2, "not yet due");

    engine.tick(500, &mut tx, &mut sink);
    assert_eq!(tx.register_count(), 4);

    // an acked entity leaves the retry set
    engine.handle_message(RESPONSE, br#"{"name":"fan"}"#, &mut sink);
    engine.tick(1000, &mut tx, &mut sink);
    assert_eq!(tx.register_count(), 5);
    let last = tx.published_to("/register").pop().unwrap();
    assert_eq!(last["name"], "temp1");
}

#[test]
fn ack_for_unknown_name_is_ignored_with_info_log() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    engine.handle_message(RESPONSE, br#"{"name":"somebody-elses"}"#, &mut sink);

    assert!(!engine.registry().get("temp1").unwrap().registered());
    assert!(sink.registered_names().is_empty());
    assert!(
        sink.logs_with(Severity::Info)
            .iter()
            .any(|m| m.contains("somebody-elses")),
        "foreign acks are informational, not errors"
    );
    assert!(sink.logs_with(Severity::Error).is_empty());
}

#[test]
fn malformed_ack_logs_one_error_and_mutates_nothing() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    engine.handle_message(RESPONSE, br#"{"name":"#, &mut sink);

    assert_eq!(sink.logs_with(Severity::Error).len(), 1);
    assert!(!engine.registry().get("temp1").unwrap().registered());
    assert!(sink.registered_names().is_empty());
}

// ── State updates ────────────────────────────────────────────

#[test]
fn sensor_round_trip_publishes_exact_update_payload() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);
    engine.publish_state("temp1", StateValue::Text("21.5".into()), 600, &mut tx, &mut sink);

    let updates = tx.published_to("/update");
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0],
        serde_json::json!({"type": "sensor", "name": "temp1", "state": "21.5"})
    );
    // and the raw bytes carry the documented field order
    let (_, payload) = tx
        .publishes
        .iter()
        .find(|(topic, _)| topic.ends_with("/update"))
        .unwrap();
    assert_eq!(
        payload.as_slice(),
        br#"{"type":"sensor","name":"temp1","state":"21.5"}"#
    );
}

#[test]
fn update_for_undeclared_entity_is_ignored_with_info_log() {
    let (mut engine, mut tx, mut sink) = make_engine();

    engine.publish_state("ghost", StateValue::Integer(1), 0, &mut tx, &mut sink);

    assert!(tx.publishes.is_empty());
    assert!(
        sink.logs_with(Severity::Info).iter().any(|m| m.contains("ghost"))
    );
}

#[test]
fn kind_mismatched_update_is_rejected_after_registration() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");
    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);

    engine.publish_state("temp1", StateValue::Integer(21), 600, &mut tx, &mut sink);

    assert_eq!(tx.update_count(), 0);
    assert_eq!(sink.logs_with(Severity::Error).len(), 1);
}

#[test]
fn disconnected_update_is_dropped_but_state_is_stored() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);
    engine.handle_message(RESPONSE, br#"{"name":"fan"}"#, &mut sink);

    tx.connected = false;
    engine.publish_state("fan", StateValue::Integer(2), 600, &mut tx, &mut sink);
    assert_eq!(tx.update_count(), 0, "fire-and-forget, no queueing");

    // the local model kept the value; the next publish carries it
    tx.connected = true;
    engine.publish_state("fan", StateValue::Integer(2), 700, &mut tx, &mut sink);
    let updates = tx.published_to("/update");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["state"], 2);
}

// ── Action commands ──────────────────────────────────────────

#[test]
fn action_to_registered_actuator_fires_exactly_once_per_message() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);
    engine.handle_message(RESPONSE, br#"{"name":"fan"}"#, &mut sink);

    engine.handle_message(ACTION, br#"{"name":"fan","state":2}"#, &mut sink);
    engine.handle_message(ACTION, br#"{"name":"fan","state":7}"#, &mut sink);

    assert_eq!(sink.actuator_commands(), vec![("fan", 2), ("fan", 7)]);
}

#[test]
fn action_to_unregistered_or_unknown_actuator_is_dropped() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);

    engine.handle_message(ACTION, br#"{"name":"fan","state":2}"#, &mut sink);
    engine.handle_message(ACTION, br#"{"name":"ghost","state":2}"#, &mut sink);

    assert!(sink.actuator_commands().is_empty());
}

#[test]
fn action_addressed_to_a_sensor_is_dropped() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");
    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);

    engine.handle_message(ACTION, br#"{"name":"temp1","state":2}"#, &mut sink);

    assert!(sink.actuator_commands().is_empty());
}

#[test]
fn malformed_action_logs_one_error() {
    let (mut engine, _tx, mut sink) = make_engine();
    engine.handle_message(ACTION, br#"{"name":"fan","state":"two"}"#, &mut sink);
    assert_eq!(sink.logs_with(Severity::Error).len(), 1);
    assert!(sink.actuator_commands().is_empty());
}

// ── Topic routing ────────────────────────────────────────────

#[test]
fn unexpected_topic_is_a_warning_not_an_error() {
    let (mut engine, _tx, mut sink) = make_engine();
    engine.handle_message("devices/HOMELINK-0001/telemetry", b"{}", &mut sink);
    assert_eq!(sink.logs_with(Severity::Warning).len(), 1);
    assert!(sink.logs_with(Severity::Error).is_empty());
}

// ── Name collisions across kinds ─────────────────────────────

#[test]
fn second_kind_under_same_name_is_rejected_deterministically() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "light", 2);
    add_sensor(&mut engine, &mut tx, &mut sink, "light");

    assert_eq!(engine.registry().len(), 1);
    assert_eq!(
        engine.registry().get("light").unwrap().kind(),
        homelink::entity::EntityKind::Actuator,
        "the first declaration stands"
    );
    assert!(
        sink.logs_with(Severity::Error)
            .iter()
            .any(|m| m.contains("light")),
        "the conflicting declaration is reported"
    );
}

// ── Link edges ───────────────────────────────────────────────

#[test]
fn reconnect_resets_registrations_and_reannounces() {
    let (mut engine, mut tx, mut sink) = make_engine();
    add_actuator(&mut engine, &mut tx, &mut sink, "fan", 3);
    add_sensor(&mut engine, &mut tx, &mut sink, "temp1");

    engine.tick(0, &mut tx, &mut sink);
    engine.handle_message(RESPONSE, br#"{"name":"fan"}"#, &mut sink);
    engine.handle_message(RESPONSE, br#"{"name":"temp1"}"#, &mut sink);
    assert!(engine.registry().iter().all(homelink::entity::Entity::registered));
    let before = tx.register_count();

    // link drops, then comes back
    tx.connected = false;
    engine.tick(1000, &mut tx, &mut sink);
    assert_eq!(sink.logs_with(Severity::Warning).len(), 1);

    tx.connected = true;
    engine.tick(2000, &mut tx, &mut sink);

    assert!(
        engine.registry().iter().all(|e| !e.registered()),
        "reconnect forgets every acknowledgment"
    );
    assert_eq!(
        tx.register_count(),
        before + 2,
        "both entities re-announce on the same tick"
    );
}

#[test]
fn disconnect_warning_is_emitted_once_per_edge() {
    let (mut engine, mut tx, mut sink) = make_engine();
    engine.tick(0, &mut tx, &mut sink);

    tx.connected = false;
    engine.tick(100, &mut tx, &mut sink);
    engine.tick(200, &mut tx, &mut sink);
    engine.tick(300, &mut tx, &mut sink);

    assert_eq!(sink.logs_with(Severity::Warning).len(), 1);
}

// ── Connection query ─────────────────────────────────────────

#[test]
fn connection_query_reports_transport_state() {
    let (mut engine, mut tx, mut sink) = make_engine();

    engine.handle_command(DeviceCommand::QueryConnection, 0, &mut tx, &mut sink);
    tx.connected = false;
    engine.handle_command(DeviceCommand::QueryConnection, 0, &mut tx, &mut sink);

    let statuses: Vec<bool> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConnectionStatus { connected } => Some(*connected),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, vec![true, false]);
}
