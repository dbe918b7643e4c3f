//! JSON codec for the executor command channel.
//!
//! Inbound frames carry one command object:
//!
//! ```text
//! {"command":"register","type":"actuator","name":"fan","level":3}
//! {"command":"register","type":"sensor","name":"temp1","data_type":"float"}
//! {"command":"update","type":"sensor","name":"temp1","state":"21.5"}
//! {"command":"update","type":"actuator","name":"fan","state":2}
//! {"command":"connection"}
//! ```
//!
//! Outbound events mirror the shapes the executor expects:
//!
//! ```text
//! {"type":"info","message":"..."}
//! {"type":"register","entity":"sensor","name":"temp1"}
//! {"type":"actuator","name":"fan","value":2}
//! {"type":"connection","status":true}
//! ```
//!
//! Field-by-field decoding (rather than one derive) keeps the error
//! variants precise: a missing `level` and an unsupported `data_type` are
//! different failures with different log lines.

use serde_json::{Value, json};

use crate::app::commands::DeviceCommand;
use crate::app::events::AppEvent;
use crate::entity::{SensorDataType, StateValue};
use crate::error::CommandError;

/// Decode one complete frame into a [`DeviceCommand`].
pub fn decode_command(frame: &[u8]) -> Result<DeviceCommand, CommandError> {
    let doc: Value = serde_json::from_slice(frame).map_err(|_| CommandError::Malformed)?;
    let command = doc
        .get("command")
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingField("command"))?;
    match command {
        "connection" => Ok(DeviceCommand::QueryConnection),
        "register" => decode_register(&doc),
        "update" => decode_update(&doc),
        _ => Err(CommandError::UnknownCommand),
    }
}

fn entity_kind(doc: &Value) -> Result<&str, CommandError> {
    doc.get("type")
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingField("type"))
}

fn entity_name(doc: &Value) -> Result<String, CommandError> {
    doc.get("name")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(CommandError::MissingField("name"))
}

fn decode_register(doc: &Value) -> Result<DeviceCommand, CommandError> {
    let name = entity_name(doc)?;
    match entity_kind(doc)? {
        "actuator" => {
            let level = doc
                .get("level")
                .and_then(Value::as_u64)
                .and_then(|v| u16::try_from(v).ok())
                .ok_or(CommandError::MissingField("level"))?;
            Ok(DeviceCommand::AddActuator { name, level })
        }
        "sensor" => {
            let raw = doc
                .get("data_type")
                .and_then(Value::as_str)
                .ok_or(CommandError::MissingField("data_type"))?;
            let data_type =
                SensorDataType::parse(raw).ok_or(CommandError::UnsupportedDataType)?;
            Ok(DeviceCommand::AddSensor { name, data_type })
        }
        _ => Err(CommandError::UnknownEntityKind),
    }
}

fn decode_update(doc: &Value) -> Result<DeviceCommand, CommandError> {
    let name = entity_name(doc)?;
    let value = match entity_kind(doc)? {
        "actuator" => {
            let state = doc
                .get("state")
                .and_then(Value::as_i64)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or(CommandError::MissingField("state"))?;
            StateValue::Integer(state)
        }
        "sensor" => {
            let state = doc
                .get("state")
                .and_then(Value::as_str)
                .ok_or(CommandError::MissingField("state"))?;
            StateValue::Text(state.to_owned())
        }
        _ => return Err(CommandError::UnknownEntityKind),
    };
    Ok(DeviceCommand::PublishState { name, value })
}

/// Encode an event as one executor-bound JSON object.
///
/// The host writes the returned bytes as one line on the serial channel.
pub fn encode_event(event: &AppEvent) -> Vec<u8> {
    let doc = match event {
        AppEvent::Log { severity, message } => json!({
            "type": severity.as_str(),
            "message": message,
        }),
        AppEvent::EntityRegistered { name, kind } => json!({
            "type": "register",
            "entity": kind.as_str(),
            "name": name,
        }),
        AppEvent::ActuatorCommand { name, value } => json!({
            "type": "actuator",
            "name": name,
            "value": value,
        }),
        AppEvent::ConnectionStatus { connected } => json!({
            "type": "connection",
            "status": connected,
        }),
    };
    doc.to_string().into_bytes()
}
