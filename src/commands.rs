//! Built-in commands.
//!
//! Each command owns its [`CommandSpec`] and implements its action against a
//! [`CommandContext`]; the executor does everything else.

use crate::error::SpecError;
use crate::normalize::RawRejection;
use crate::registry::CommandRegistry;
use serde_json::Value;
use std::sync::Arc;

pub mod aad;
pub mod flow;
pub mod spo;
pub mod teams;
pub mod yammer;

/// Register every built-in command. Fails on the first malformed spec.
pub fn register_all(registry: &mut CommandRegistry) -> Result<(), SpecError> {
    registry.register(Arc::new(yammer::SearchCommand::new()?))?;
    registry.register(Arc::new(teams::TabGetCommand::new()?))?;
    registry.register(Arc::new(teams::AppPublishCommand::new()?))?;
    registry.register(Arc::new(aad::TeamifyCommand::new()?))?;
    registry.register(Arc::new(spo::RoleInheritanceBreakCommand::new()?))?;
    registry.register(Arc::new(spo::AppPermissionRemoveCommand::new()?))?;
    registry.register(Arc::new(spo::TermSetGetCommand::new()?))?;
    registry.register(Arc::new(flow::RunGetCommand::new()?))?;
    Ok(())
}

/// Percent-encode one path or query segment.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode a value placed inside a quoted OData literal. Single quotes stay
/// literal and are doubled.
pub fn encode_query_parameter(value: &str) -> String {
    encode(value).replace("%27", "''")
}

/// Escape text placed inside an XML element or attribute.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The `value` array of an OData collection response.
pub fn collection(body: &Value) -> &[Value] {
    body.get("value")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn id_of(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Resolve a lookup that must match exactly one item.
pub fn single_id(
    items: &[Value],
    not_found: impl FnOnce() -> String,
    ambiguous: impl FnOnce(Vec<String>) -> String,
) -> Result<String, RawRejection> {
    match items {
        [] => Err(RawRejection::message(not_found())),
        [item] => id_of(item).ok_or_else(|| RawRejection::message("Lookup returned an item without an id")),
        many => Err(RawRejection::message(ambiguous(
            many.iter().filter_map(id_of).collect(),
        ))),
    }
}
