//! HomeLink client — host simulation harness.
//!
//! Drives the sync engine against an in-process scripted broker, end to
//! end: executor command frames come in over a simulated serial byte
//! stream, registration requests go out and are acknowledged (some only
//! after a retry), state updates flow once entities are registered, and a
//! mid-run link drop shows the re-announce path.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  SimBroker          SerialBridge          MonotonicClock │
//! │  (TransportPort)    (EventSink → stdout)  (time source)  │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            SyncEngine (pure protocol)              │  │
//! │  │  EntityRegistry · TopicSet · retry pacing          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::info;

use homelink::adapters::clock::MonotonicClock;
use homelink::adapters::log_sink::LogEventSink;
use homelink::app::events::AppEvent;
use homelink::app::ports::{EventSink, TransportPort};
use homelink::app::service::SyncEngine;
use homelink::config::DeviceConfig;
use homelink::error::Error;
use homelink::link::{CommandDecoder, decode_command, encode_event};

// ── Scripted broker ───────────────────────────────────────────
//
// Plays the supervisor: acknowledges registration requests (some only
// after repeated attempts) and can inject action commands. Inbound
// messages queue in `inbox` until the pump delivers them, mirroring a
// real transport's event pump.

struct SimBroker {
    connected: bool,
    inbox: VecDeque<(String, Vec<u8>)>,
    register_counts: HashMap<String, u32>,
    /// Registration requests to swallow before acking, per entity name.
    ack_after: HashMap<String, u32>,
    response_topic: String,
}

impl SimBroker {
    fn new(device_id: &str) -> Self {
        Self {
            connected: true,
            inbox: VecDeque::new(),
            register_counts: HashMap::new(),
            ack_after: HashMap::new(),
            response_topic: format!("devices/{device_id}/response"),
        }
    }

    /// Queue a broker-originated message for the next pump.
    fn inject(&mut self, topic: &str, payload: &[u8]) {
        self.inbox.push_back((topic.to_owned(), payload.to_vec()));
    }

    /// Deliver every queued message into the engine.
    fn pump(&mut self, engine: &mut SyncEngine, sink: &mut impl EventSink) {
        while let Some((topic, payload)) = self.inbox.pop_front() {
            engine.handle_message(&topic, &payload, sink);
        }
    }
}

impl TransportPort for SimBroker {
    fn connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if !self.connected {
            return false;
        }
        info!("SIM | device -> broker {} {}", topic, String::from_utf8_lossy(payload));
        if topic.ends_with("/register") {
            if let Ok(doc) = serde_json::from_slice::<serde_json::Value>(payload) {
                if let Some(name) = doc.get("name").and_then(serde_json::Value::as_str) {
                    let count = self.register_counts.entry(name.to_owned()).or_insert(0);
                    *count += 1;
                    let needed = self.ack_after.get(name).copied().unwrap_or(1);
                    if *count >= needed {
                        let ack = format!(r#"{{"name":"{name}"}}"#);
                        let topic = self.response_topic.clone();
                        self.inject(&topic, ack.as_bytes());
                    }
                }
            }
        }
        true
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        info!("SIM | subscribed {}", topic);
        self.connected
    }
}

// ── Serial bridge sink ────────────────────────────────────────
//
// Forwards every engine event to the executor as one JSON line on
// stdout, and to the process logger for humans.

struct SerialBridge {
    log: LogEventSink,
}

impl SerialBridge {
    fn new() -> Self {
        Self {
            log: LogEventSink::new(),
        }
    }
}

impl EventSink for SerialBridge {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        let mut line = encode_event(event);
        line.push(b'\n');
        let _ = std::io::stdout().write_all(&line);
    }
}

// ── Serial input ──────────────────────────────────────────────

/// Push executor bytes through the frame decoder and dispatch every
/// complete command. Decode failures are reported on the event sink the
/// same way the device reports them to the executor.
fn feed_serial(
    bytes: &[u8],
    decoder: &mut CommandDecoder,
    engine: &mut SyncEngine,
    now_ms: u64,
    broker: &mut SimBroker,
    sink: &mut impl EventSink,
) {
    for &b in bytes {
        match decoder.push(b) {
            Ok(None) => {}
            Ok(Some(frame)) => match decode_command(frame) {
                Ok(cmd) => engine.handle_command(cmd, now_ms, broker, sink),
                Err(e) => {
                    let e = Error::from(e);
                    sink.emit(&AppEvent::error(format!("command rejected: {e}")));
                }
            },
            Err(e) => {
                let e = Error::from(e);
                sink.emit(&AppEvent::error(format!("frame dropped: {e}")));
            }
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DeviceConfig::default();
    info!("HomeLink client v{} (device '{}')", env!("CARGO_PKG_VERSION"), config.device_id);

    let mut engine = SyncEngine::new(&config);
    let mut broker = SimBroker::new(&config.device_id);
    let mut sink = SerialBridge::new();
    let mut decoder = CommandDecoder::new();
    let clock = MonotonicClock::new();

    // temp1's first registration request goes unanswered, so the resend
    // timer has something to do.
    broker.ack_after.insert("temp1".to_owned(), 2);

    engine.start(&mut broker, &mut sink);

    // Boot-time declarations from the executor, including one the device
    // must reject.
    let boot_frames: [&str; 4] = [
        r#"{"command":"register","type":"actuator","name":"fan","level":3}"#,
        r#"{"command":"register","type":"sensor","name":"temp1","data_type":"float"}"#,
        r#"{"command":"register","type":"sensor","name":"hum","data_type":"percent"}"#,
        r#"{"command":"connection"}"#,
    ];
    for frame in boot_frames {
        feed_serial(frame.as_bytes(), &mut decoder, &mut engine, clock.now_ms(), &mut broker, &mut sink);
    }

    let action_topic = format!("devices/{}/action", config.device_id);
    let response_topic = format!("devices/{}/response", config.device_id);

    for step in 0..14 {
        let now = clock.now_ms();
        match step {
            2 => broker.inject(&response_topic, br#"{"name":"#),
            3 | 6 => feed_serial(
                br#"{"command":"update","type":"sensor","name":"temp1","state":"21.5"}"#,
                &mut decoder,
                &mut engine,
                now,
                &mut broker,
                &mut sink,
            ),
            5 => broker.inject(&action_topic, br#"{"name":"fan","state":2}"#),
            8 => {
                info!("SIM | dropping the broker link");
                broker.connected = false;
            }
            10 => {
                info!("SIM | broker link back up");
                broker.connected = true;
            }
            _ => {}
        }

        broker.pump(&mut engine, &mut sink);
        engine.tick(clock.now_ms(), &mut broker, &mut sink);
        thread::sleep(Duration::from_millis(150));
    }

    info!(
        "done after {}s: {} entities, {} registration publishes, {} state publishes, {} ticks",
        clock.uptime_secs(),
        engine.registry().len(),
        engine.registers_sent(),
        engine.updates_sent(),
        engine.tick_count(),
    );
    Ok(())
}
