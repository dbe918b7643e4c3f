//! Fuzz target: `SyncEngine::handle_message`
//!
//! Throws arbitrary payloads at both subscribed topics of a populated
//! engine. Malformed input must be dropped without panicking, and the
//! registration flag must only ever be set by an exact name match.
//!
//! cargo fuzz run fuzz_inbound_message

#![no_main]

use homelink::app::commands::DeviceCommand;
use homelink::app::events::AppEvent;
use homelink::app::ports::{EventSink, TransportPort};
use homelink::app::service::SyncEngine;
use homelink::config::DeviceConfig;
use homelink::entity::SensorDataType;
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

struct NullTransport;

impl TransportPort for NullTransport {
    fn connected(&self) -> bool {
        false
    }
    fn publish(&mut self, _topic: &str, _payload: &[u8]) -> bool {
        false
    }
    fn subscribe(&mut self, _topic: &str) -> bool {
        false
    }
}

fuzz_target!(|data: &[u8]| {
    let mut engine = SyncEngine::new(&DeviceConfig::default());
    let mut tx = NullTransport;
    let mut sink = NullSink;

    engine.handle_command(
        DeviceCommand::AddActuator {
            name: "fan".into(),
            level: 3,
        },
        0,
        &mut tx,
        &mut sink,
    );
    engine.handle_command(
        DeviceCommand::AddSensor {
            name: "temp1".into(),
            data_type: SensorDataType::Float,
        },
        0,
        &mut tx,
        &mut sink,
    );

    engine.handle_message("devices/HOMELINK-0001/response", data, &mut sink);
    engine.handle_message("devices/HOMELINK-0001/action", data, &mut sink);

    // only an ack whose name field exactly matches may register an entity
    let payload = String::from_utf8_lossy(data);
    for name in ["fan", "temp1"] {
        if engine.registry().get(name).expect("declared").registered() {
            assert!(payload.contains(name));
        }
    }
});
