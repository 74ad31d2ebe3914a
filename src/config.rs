//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global config file, then
//! an explicit `--config` file, then `TENANTCTL_*` environment variables.
//! Nested keys are addressed from the environment with a double underscore,
//! e.g. `TENANTCTL_HTTP__REQUEST_TIMEOUT_SECS=30`.

use crate::error::CommandError;
use crate::logging::LoggingConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

mod merge;
mod sources;

use merge::merge_policy::{
    builder_with_defaults, DEFAULT_AZURE_MANAGEMENT_ENDPOINT, DEFAULT_GRAPH_ENDPOINT,
    DEFAULT_YAMMER_ENDPOINT,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service roots, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_graph")]
    pub graph: String,
    #[serde(default = "default_yammer")]
    pub yammer: String,
    #[serde(default = "default_azure_management")]
    pub azure_management: String,
    /// Tenant admin site, e.g. `https://contoso-admin.sharepoint.com`.
    /// Required by term store commands only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharepoint_admin: Option<String>,
}

fn default_graph() -> String {
    DEFAULT_GRAPH_ENDPOINT.to_string()
}

fn default_yammer() -> String {
    DEFAULT_YAMMER_ENDPOINT.to_string()
}

fn default_azure_management() -> String {
    DEFAULT_AZURE_MANAGEMENT_ENDPOINT.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            graph: default_graph(),
            yammer: default_yammer(),
            azure_management: default_azure_management(),
            sharepoint_admin: None,
        }
    }
}

impl EndpointConfig {
    /// Join a service root and a relative path with exactly one slash.
    pub fn join(root: &str, path: &str) -> String {
        format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Stored credentials.
///
/// `tokens` maps a resource origin (`https://contoso.sharepoint.com`) to a
/// bearer token; `access_token` is used for any resource without an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `json` or `text`
    #[serde(default = "default_output_format")]
    pub format: String,
}

fn default_output_format() -> String {
    "json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
        }
    }
}

impl AppConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let endpoints = [
            ("endpoints.graph", Some(&self.endpoints.graph)),
            ("endpoints.yammer", Some(&self.endpoints.yammer)),
            ("endpoints.azure_management", Some(&self.endpoints.azure_management)),
            ("endpoints.sharepoint_admin", self.endpoints.sharepoint_admin.as_ref()),
        ];
        for (name, value) in endpoints
            .into_iter()
            .filter_map(|(name, value)| Some((name, value?)))
        {
            match Url::parse(value) {
                Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {}
                _ => errors.push(format!("{}: '{}' is not an absolute http(s) URL", name, value)),
            }
        }

        if self.http.connect_timeout_secs == 0 {
            errors.push("http.connect_timeout_secs must be greater than zero".to_string());
        }
        if self.http.request_timeout_secs == 0 {
            errors.push("http.request_timeout_secs must be greater than zero".to_string());
        }
        if self.output.format != "json" && self.output.format != "text" {
            errors.push(format!(
                "output.format: '{}' (must be 'json' or 'text')",
                self.output.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Builds [`AppConfig`] from its layered sources.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Location of the global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    /// Load every layer; `explicit` must exist when given.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, CommandError> {
        let mut builder = sources::global_file::add_to_builder(builder_with_defaults()?)?;
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CommandError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(environment());

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Self::checked(config)
    }

    /// Load a single file over the defaults, without global or environment
    /// layers.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, CommandError> {
        let config: AppConfig = builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()?;
        Self::checked(config)
    }

    fn checked(config: AppConfig) -> Result<AppConfig, CommandError> {
        config.validate().map_err(|errors| {
            CommandError::config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })?;
        debug!(graph = %config.endpoints.graph, "Configuration loaded");
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("TENANTCTL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
