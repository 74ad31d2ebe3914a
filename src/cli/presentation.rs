//! CLI presentation: json and text formatters for command results.

use crate::error::CommandError;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(CommandError::validation(format!(
                "Invalid output type: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Render a command result. `properties` restricts text output to the
/// command's default properties when it declares them.
pub fn render(
    value: &Value,
    format: OutputFormat,
    properties: Option<&[String]>,
) -> Result<String, CommandError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CommandError::transport(format!("Failed to serialize output: {}", e))),
        OutputFormat::Text => Ok(render_text(value, properties)),
    }
}

fn render_text(value: &Value, properties: Option<&[String]>) -> String {
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            render_table(items, properties)
        }
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
        Value::Object(fields) => render_fields(fields, properties),
        other => scalar_text(other),
    }
}

fn columns(items: &[Value], properties: Option<&[String]>) -> Vec<String> {
    if let Some(properties) = properties {
        return properties.to_vec();
    }
    let mut columns: Vec<String> = Vec::new();
    for fields in items.iter().filter_map(Value::as_object) {
        for key in fields.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn render_table(items: &[Value], properties: Option<&[String]>) -> String {
    let columns = columns(items, properties);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(columns.clone());
    for item in items {
        table.add_row(
            columns
                .iter()
                .map(|c| item.get(c).map(scalar_text).unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    table.to_string()
}

fn render_fields(fields: &Map<String, Value>, properties: Option<&[String]>) -> String {
    let keys: Vec<&String> = match properties {
        Some(properties) => properties.iter().collect(),
        None => fields.keys().collect(),
    };
    keys.into_iter()
        .map(|key| {
            let value = fields.get(key).map(scalar_text).unwrap_or_default();
            format!("{}: {}", key, value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strings print bare, nulls print empty, everything else as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
