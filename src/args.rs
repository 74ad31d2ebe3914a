//! Parsed invocation arguments.
//!
//! Built once at the CLI boundary from typed clap structs, then read-only for
//! the rest of the pipeline. Keys are long option names without dashes.

use serde::Serialize;
use std::collections::BTreeMap;

/// A single option value as supplied on the command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Switch(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Switch(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Switch(value) => write!(f, "{}", value),
            OptionValue::Number(value) => write!(f, "{}", value),
            OptionValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// Option name to value mapping for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    values: BTreeMap<String, OptionValue>,
}

impl ParsedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Insert only when a value was supplied.
    pub fn with_opt<V: Into<OptionValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Insert a switch only when it is on; an unset switch stays absent.
    pub fn with_switch(self, name: &str, on: bool) -> Self {
        if on {
            self.with(name, true)
        } else {
            self
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Whether the option was supplied at all, whatever its value.
    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn switch(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Switch(true)))
    }

    /// Non-negative integer value, accepting numbers and numeric text.
    pub fn as_u64(&self, name: &str) -> Option<u64> {
        match self.values.get(name)? {
            OptionValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as u64),
            OptionValue::Text(t) => t.trim().parse::<u64>().ok(),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn debug(&self) -> bool {
        self.switch("debug")
    }

    pub fn verbose(&self) -> bool {
        self.switch("verbose") || self.debug()
    }

    /// Non-interactive override for destructive commands.
    pub fn confirm(&self) -> bool {
        self.switch("confirm")
    }

    pub fn output(&self) -> Option<&str> {
        self.text("output")
    }
}
