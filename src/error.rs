//! Error types for the command execution pipeline.

use serde_json::Value;
use thiserror::Error;

/// Where a terminal failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Option-set or validator rejection, raised before any network I/O.
    Validation,
    /// A rejected service call, normalized once at the boundary.
    Transport,
    /// A page fetch failed while accumulating a multi-page result.
    Aggregation,
    /// Configuration or session problems.
    Config,
    /// The interactive prompt could not be shown or answered.
    Prompt,
}

/// The single canonical failure surfaced to the caller.
///
/// Displays as its message only; the kind and cause are for logging and tests.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct CommandError {
    kind: ErrorKind,
    message: String,
    cause: Option<Value>,
}

impl CommandError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn prompt(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Prompt, message)
    }

    /// Attach the structured payload the message was extracted from.
    pub fn with_cause(mut self, cause: Value) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Re-tag the failure without touching its message.
    pub fn into_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&Value> {
        self.cause.as_ref()
    }
}

impl From<config::ConfigError> for CommandError {
    fn from(err: config::ConfigError) -> Self {
        CommandError::config(err.to_string())
    }
}

/// Programming errors detected while a command spec is registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("Invalid option syntax '{0}'")]
    InvalidOptionSyntax(String),

    #[error("Option '{option}' is declared more than once in command '{command}'")]
    DuplicateOption { command: String, option: String },

    #[error("Option set in command '{command}' references undeclared option '{option}'")]
    UnknownSetMember { command: String, option: String },

    #[error("Option set in command '{command}' needs at least two members, got {members:?}")]
    UndersizedSet {
        command: String,
        members: Vec<String>,
    },

    #[error("Command '{0}' is registered more than once")]
    DuplicateCommand(String),
}
