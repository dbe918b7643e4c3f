//! Driven adapters — implementations of the port traits for the host side.
//!
//! The real MQTT session lives with the host application; the adapters
//! here cover the concerns the engine needs from its environment: a
//! monotonic clock for retry pacing and a logging event sink.

pub mod clock;
pub mod log_sink;
