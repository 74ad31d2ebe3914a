//! Command Executor
//!
//! Runs one command instance: telemetry, validation, confirmation, session
//! restore, action, error normalization. Output rendering is left to the
//! caller so the same pipeline serves the CLI and tests.

use crate::args::ParsedArgs;
use crate::config::EndpointConfig;
use crate::confirm::{ConfirmationGate, Decision, Prompter};
use crate::error::CommandError;
use crate::normalize::{normalize, RawRejection};
use crate::options::CommandSpec;
use crate::session::Session;
use crate::transport::{Request, Transport};
use crate::validation;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// What an action may touch while it runs.
pub struct CommandContext<'a> {
    pub transport: &'a dyn Transport,
    pub endpoints: &'a EndpointConfig,
    pub session: &'a Session,
}

impl CommandContext<'_> {
    /// Execute a request and take its body as JSON.
    pub async fn send(&self, request: Request) -> Result<Value, RawRejection> {
        Ok(self.transport.execute(request).await?.into_json())
    }
}

/// A registered command: its immutable spec plus the action behind it.
#[async_trait]
pub trait Command: Send + Sync {
    fn spec(&self) -> &CommandSpec;

    /// Question shown by the confirmation gate for destructive commands.
    fn confirmation_prompt(&self, _args: &ParsedArgs) -> String {
        format!("Are you sure you want to run {}?", self.spec().name())
    }

    /// Performs the command's work. Only called after validation passed and,
    /// for destructive commands, the gate was passed.
    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The action ran; `None` when it produced nothing to print.
    Completed(Option<Value>),
    /// The user declined the confirmation prompt. Not an error.
    Declined,
}

pub struct CommandExecutor {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    prompter: Arc<dyn Prompter>,
    endpoints: EndpointConfig,
}

impl CommandExecutor {
    pub fn new(
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        prompter: Arc<dyn Prompter>,
        endpoints: EndpointConfig,
    ) -> Self {
        Self {
            session,
            transport,
            prompter,
            endpoints,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(
        &self,
        command: &dyn Command,
        args: &ParsedArgs,
    ) -> Result<Outcome, CommandError> {
        let spec = command.spec();
        let telemetry = Value::Object(spec.telemetry_properties(args));
        debug!(
            command = spec.name(),
            properties = %telemetry,
            "Command invoked"
        );

        validation::validate(spec, args)
            .await
            .map_err(CommandError::validation)?;

        if spec.is_destructive() {
            let mut gate = ConfirmationGate::new(self.prompter.as_ref());
            let prompt = command.confirmation_prompt(args);
            if gate.pass(args.confirm(), &prompt).await? == Decision::Declined {
                info!(command = spec.name(), "Declined by user");
                return Ok(Outcome::Declined);
            }
        }

        self.session.restore_auth().await?;

        let ctx = CommandContext {
            transport: self.transport.as_ref(),
            endpoints: &self.endpoints,
            session: &self.session,
        };
        match command.action(&ctx, args).await {
            Ok(value) => {
                debug!(command = spec.name(), "Command completed");
                Ok(Outcome::Completed(value))
            }
            Err(raw) => {
                let err = normalize(raw);
                debug!(command = spec.name(), kind = ?err.kind(), error = %err, "Command failed");
                Err(err)
            }
        }
    }
}
