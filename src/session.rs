//! Auth collaborator.
//!
//! Holds the process-wide connection state and hands out bearer tokens per
//! resource. Credentials come from configuration or `TENANTCTL_ACCESS_TOKEN`.

use crate::config::AuthConfig;
use crate::error::CommandError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

pub const ACCESS_TOKEN_ENV: &str = "TENANTCTL_ACCESS_TOKEN";

/// Where credentials come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Whether a usable credential exists.
    async fn restore(&self) -> Result<bool, CommandError>;

    /// Bearer token for the resource origin, e.g. `https://graph.microsoft.com`.
    async fn token_for(&self, resource: &str) -> Result<String, CommandError>;
}

/// Tokens fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    default_token: Option<String>,
    tokens: BTreeMap<String, String>,
}

impl StaticTokenSource {
    pub fn new(default_token: Option<String>, tokens: BTreeMap<String, String>) -> Self {
        Self {
            default_token: default_token.filter(|t| !t.is_empty()),
            tokens,
        }
    }

    /// Config credentials, with the environment token taking precedence over
    /// the configured default.
    pub fn from_config(auth: &AuthConfig) -> Self {
        let default_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| auth.access_token.clone());
        Self::new(default_token, auth.tokens.clone())
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn restore(&self) -> Result<bool, CommandError> {
        Ok(self.default_token.is_some() || !self.tokens.is_empty())
    }

    async fn token_for(&self, resource: &str) -> Result<String, CommandError> {
        let resource = resource.trim_end_matches('/');
        self.tokens
            .get(resource)
            .or(self.default_token.as_ref())
            .cloned()
            .ok_or_else(|| CommandError::config(format!("No access token available for {}", resource)))
    }
}

/// Connection state shared by every component of one process.
pub struct Session {
    source: Box<dyn TokenSource>,
    connected: Mutex<bool>,
}

impl Session {
    pub fn new(source: Box<dyn TokenSource>) -> Self {
        Self {
            source,
            connected: Mutex::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.lock()
    }

    /// Re-establish the connection before an action runs.
    pub async fn restore_auth(&self) -> Result<(), CommandError> {
        if self.is_connected() {
            return Ok(());
        }
        if !self.source.restore().await? {
            return Err(CommandError::config(format!(
                "Log in first: set auth.access_token in the config file or {}",
                ACCESS_TOKEN_ENV
            )));
        }
        *self.connected.lock() = true;
        debug!("Session restored");
        Ok(())
    }

    pub async fn access_token(&self, resource: &str) -> Result<String, CommandError> {
        self.source.token_for(resource).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.is_connected())
            .finish()
    }
}
