//! Error Normalizer
//!
//! Every way a command action can fail is first captured as a [`RawRejection`]
//! and converted exactly once into a [`CommandError`] by [`normalize`].

use crate::error::{CommandError, ErrorKind};
use serde_json::Value;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Closed set of raw failure shapes produced below the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRejection {
    /// Body returned by a service together with a non-success status. Text
    /// bodies that are not JSON arrive as `Value::String`.
    Payload(Value),
    /// A bare message, as produced by lookups that found nothing.
    Message(String),
    /// The request never produced a service response.
    Network(String),
    /// A page fetch failed while aggregating a paged result.
    Page { page: u32, source: Box<RawRejection> },
    /// A local failure that already carries its final kind, such as a
    /// missing credential or endpoint.
    Failed(CommandError),
}

impl RawRejection {
    pub fn message(message: impl Into<String>) -> Self {
        RawRejection::Message(message.into())
    }
}

impl From<serde_json::Error> for RawRejection {
    fn from(err: serde_json::Error) -> Self {
        RawRejection::Message(format!("Failed to parse response: {}", err))
    }
}

impl From<std::io::Error> for RawRejection {
    fn from(err: std::io::Error) -> Self {
        RawRejection::Message(err.to_string())
    }
}

/// Convert a raw rejection into the canonical failure. Never fails and never
/// produces an empty message.
pub fn normalize(raw: RawRejection) -> CommandError {
    match raw {
        RawRejection::Page { page, source } => {
            tracing::debug!(page, "Paged fetch rejected; discarding accumulated pages");
            normalize(*source).into_kind(ErrorKind::Aggregation)
        }
        RawRejection::Message(message) | RawRejection::Network(message) => {
            CommandError::transport(non_empty(message))
        }
        RawRejection::Payload(payload) => {
            let message = payload_message(&payload);
            CommandError::transport(non_empty(message)).with_cause(payload)
        }
        RawRejection::Failed(err) => err,
    }
}

/// Dispatch by payload shape in priority order.
fn payload_message(payload: &Value) -> String {
    if let Some(message) = envelope_message(payload) {
        return message;
    }
    if let Value::String(text) = payload {
        return text.clone();
    }
    if let Some(message) = odata_message(payload) {
        return message;
    }
    match payload {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Service envelopes that carry a dedicated human-readable description.
fn envelope_message(payload: &Value) -> Option<String> {
    let error = payload.get("error")?;
    error
        .get("base")
        .and_then(Value::as_str)
        .or_else(|| {
            error
                .pointer("/odata.error/message/value")
                .and_then(Value::as_str)
        })
        .or_else(|| error.get("error_description").and_then(Value::as_str))
        .map(str::to_string)
}

/// OData-style `{error: {error: {message}}}`, `{error: {message}}`, or an
/// `error` string that may itself hold serialized JSON.
fn odata_message(payload: &Value) -> Option<String> {
    if let Some(error) = payload.get("error") {
        if let Some(message) = error.pointer("/error/message").and_then(Value::as_str) {
            return Some(message.to_string());
        }
        if let Some(message) = error.get("message").and_then(Value::as_str) {
            return Some(message.to_string());
        }
        if let Value::String(text) = error {
            let nested = serde_json::from_str::<Value>(text)
                .ok()
                .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string));
            return Some(nested.unwrap_or_else(|| text.clone()));
        }
    }
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
