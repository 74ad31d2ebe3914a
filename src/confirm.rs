//! Interactive Confirmation Gate
//!
//! Destructive commands ask before acting unless `--confirm` was passed.
//! Declining is not an error; it ends the invocation with nothing done.

use crate::error::CommandError;
use async_trait::async_trait;
use dialoguer::Confirm;
use tracing::debug;

/// The only interactive I/O surface of the pipeline.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, message: &str) -> Result<bool, CommandError>;
}

/// Yes/no prompt on the controlling terminal.
///
/// The blocking read runs on tokio's blocking pool so the invocation's task
/// only suspends while waiting for the answer.
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> Result<bool, CommandError> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
        })
        .await
        .map_err(|e| CommandError::prompt(format!("Prompt task failed: {}", e)))?
        .map_err(|e| CommandError::prompt(format!("Failed to get user input: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Declined,
}

pub struct ConfirmationGate<'a> {
    prompter: &'a dyn Prompter,
    state: GateState,
}

impl<'a> ConfirmationGate<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self {
            prompter,
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Ask `message` unless `skip` is set. Resumes exactly once with the
    /// answer and always returns to `Idle`.
    pub async fn pass(&mut self, skip: bool, message: &str) -> Result<Decision, CommandError> {
        if skip {
            return Ok(Decision::Proceed);
        }

        self.state = GateState::AwaitingConfirmation;
        let answer = self.prompter.confirm(message).await;
        self.state = GateState::Idle;

        let decision = if answer? {
            Decision::Proceed
        } else {
            Decision::Declined
        };
        debug!(?decision, "Confirmation answered");
        Ok(decision)
    }
}
