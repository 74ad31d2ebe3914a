//! Shared test utilities for integration tests
//!
//! Scripted collaborators for the executor plus environment isolation for
//! configuration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tenantctl::config::EndpointConfig;
use tenantctl::confirm::Prompter;
use tenantctl::error::CommandError;
use tenantctl::executor::CommandExecutor;
use tenantctl::normalize::RawRejection;
use tenantctl::session::{Session, StaticTokenSource};
use tenantctl::transport::{Method, Request, ResponseBody, Transport};

type Handler = Box<dyn Fn(&Request) -> Result<ResponseBody, RawRejection> + Send + Sync>;

/// Transport that answers from a closure and records every request.
pub struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Request) -> Result<ResponseBody, RawRejection> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn urls(&self, method: Method) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<ResponseBody, RawRejection> {
        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}

/// The rejection the service fakes return for unexpected URLs.
pub fn invalid_request() -> Result<ResponseBody, RawRejection> {
    Err(RawRejection::Payload(serde_json::Value::String(
        "Invalid request".to_string(),
    )))
}

/// Prompter with a fixed answer that records what it was asked.
pub struct ScriptedPrompter {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> Result<bool, CommandError> {
        self.asked.lock().push(message.to_string());
        Ok(self.answer)
    }
}

pub fn tokens() -> StaticTokenSource {
    StaticTokenSource::new(Some("test-token".to_string()), BTreeMap::new())
}

pub fn executor(
    transport: Arc<ScriptedTransport>,
    prompter: Arc<ScriptedPrompter>,
) -> CommandExecutor {
    CommandExecutor::new(
        Arc::new(Session::new(Box::new(tokens()))),
        transport,
        prompter,
        EndpointConfig::default(),
    )
}

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run `f` with XDG_CONFIG_HOME pointing into `test_dir` and the given
/// variables set, restoring the previous environment afterwards.
pub fn with_config_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let mut names: Vec<&str> = vars.iter().map(|(name, _)| *name).collect();
    names.push("XDG_CONFIG_HOME");
    let saved: Vec<(String, Option<String>)> = names
        .iter()
        .map(|name| (name.to_string(), std::env::var(name).ok()))
        .collect();

    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}
