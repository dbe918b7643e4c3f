//! End-to-end tests for the executor serial path: raw bytes through the
//! frame decoder, into the command codec, into the engine, out to the
//! transport — the same chain the host binary wires up.

use crate::mock_link::{EventRecorder, MockTransport};

use homelink::app::events::{AppEvent, Severity};
use homelink::app::ports::EventSink;
use homelink::app::service::SyncEngine;
use homelink::config::DeviceConfig;
use homelink::link::{CommandDecoder, decode_command};

/// Drive raw executor bytes through decode → dispatch, like the host loop.
fn feed(
    bytes: &[u8],
    decoder: &mut CommandDecoder,
    engine: &mut SyncEngine,
    now_ms: u64,
    tx: &mut MockTransport,
    sink: &mut EventRecorder,
) {
    for &b in bytes {
        match decoder.push(b) {
            Ok(None) => {}
            Ok(Some(frame)) => match decode_command(frame) {
                Ok(cmd) => engine.handle_command(cmd, now_ms, tx, sink),
                Err(e) => sink.emit(&AppEvent::error(format!("command rejected: {e}"))),
            },
            Err(e) => sink.emit(&AppEvent::error(format!("frame dropped: {e}"))),
        }
    }
}

#[test]
fn serial_bytes_drive_the_full_registration_flow() {
    let mut engine = SyncEngine::new(&DeviceConfig::default());
    let mut tx = MockTransport::new();
    let mut sink = EventRecorder::new();
    let mut decoder = CommandDecoder::new();
    engine.start(&mut tx, &mut sink);

    // declaration and first update arrive as one interleaved byte stream,
    // split mid-frame the way a UART read would
    let stream = concat!(
        r#"{"command":"register","type":"sensor","#,
        r#""name":"temp1","data_type":"float"}"#,
        "\r\n",
        r#"{"command":"update","type":"sensor","name":"temp1","state":"21.5"}"#,
    );
    let (first, second) = stream.as_bytes().split_at(40);
    feed(first, &mut decoder, &mut engine, 0, &mut tx, &mut sink);
    feed(second, &mut decoder, &mut engine, 0, &mut tx, &mut sink);

    // entity declared; the update was gated into a registration request
    assert_eq!(engine.registry().len(), 1);
    assert_eq!(tx.register_count(), 1);
    assert_eq!(tx.update_count(), 0);
    let register = &tx.published_to("/register")[0];
    assert_eq!(
        *register,
        serde_json::json!({"type": "sensor", "name": "temp1", "data_type": "float"})
    );

    // ack, then re-send the update
    engine.handle_message("devices/HOMELINK-0001/response", br#"{"name":"temp1"}"#, &mut sink);
    feed(
        br#"{"command":"update","type":"sensor","name":"temp1","state":"21.5"}"#,
        &mut decoder,
        &mut engine,
        600,
        &mut tx,
        &mut sink,
    );
    let updates = tx.published_to("/update");
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0],
        serde_json::json!({"type": "sensor", "name": "temp1", "state": "21.5"})
    );
}

#[test]
fn invalid_declarations_from_the_executor_are_reported_not_applied() {
    let mut engine = SyncEngine::new(&DeviceConfig::default());
    let mut tx = MockTransport::new();
    let mut sink = EventRecorder::new();
    let mut decoder = CommandDecoder::new();

    // unsupported data_type dies in the codec; zero level dies in the registry
    feed(
        br#"{"command":"register","type":"sensor","name":"hum","data_type":"percent"}"#,
        &mut decoder,
        &mut engine,
        0,
        &mut tx,
        &mut sink,
    );
    feed(
        br#"{"command":"register","type":"actuator","name":"fan","level":0}"#,
        &mut decoder,
        &mut engine,
        0,
        &mut tx,
        &mut sink,
    );

    assert!(engine.registry().is_empty());
    assert_eq!(sink.logs_with(Severity::Error).len(), 2);
    assert!(tx.publishes.is_empty());
}

#[test]
fn line_noise_between_commands_is_survived() {
    let mut engine = SyncEngine::new(&DeviceConfig::default());
    let mut tx = MockTransport::new();
    let mut sink = EventRecorder::new();
    let mut decoder = CommandDecoder::new();

    let stream = b"\xff\xfe boot garbage \r\n{\"command\":\"register\",\"type\":\"actuator\",\"name\":\"fan\",\"level\":3}trailing";
    feed(stream, &mut decoder, &mut engine, 0, &mut tx, &mut sink);

    assert_eq!(engine.registry().len(), 1);
    assert!(engine.registry().get("fan").is_some());
    assert!(sink.logs_with(Severity::Error).is_empty());
}
