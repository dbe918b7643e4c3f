//! Executor serial link — framing and JSON codec at the wire boundary.
//!
//! The UART itself belongs to the host; this module owns what flows over
//! it: [`decoder`] reassembles newline-free JSON object frames from the
//! raw byte stream, and [`codec`] turns complete frames into
//! [`DeviceCommand`](crate::app::commands::DeviceCommand)s and
//! [`AppEvent`](crate::app::events::AppEvent)s into executor-bound JSON.

pub mod codec;
pub mod decoder;

pub use codec::{decode_command, encode_event};
pub use decoder::CommandDecoder;
