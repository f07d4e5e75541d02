//! Payload parser for data source messages
//!
//! Accepts either the envelope `{"data": [records...]}` or a bare array of records.
//! Records are returned unvalidated; the lifecycle manager checks them one by one.

use serde_json::Value;
use tracing::{trace, warn};

/// Parse one message into its raw records.
///
/// Returns None if the message is not JSON or carries no record array.
pub fn parse_payload(msg: &str) -> Option<Vec<Value>> {
    trace!(len = msg.len(), "Parsing payload");

    let json: Value = serde_json::from_str(msg)
        .map_err(|e| {
            warn!(error = %e, "Failed to parse JSON");
        })
        .ok()?;

    match json {
        Value::Array(records) => Some(records),
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(records)) => Some(records),
            other => {
                warn!(data = ?other.as_ref().map(kind), "Payload has no record array");
                None
            }
        },
        other => {
            warn!(kind = kind(&other), "Unexpected payload");
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
