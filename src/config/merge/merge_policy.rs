//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";
pub const DEFAULT_YAMMER_ENDPOINT: &str = "https://www.yammer.com/api";
pub const DEFAULT_AZURE_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; tables are merged, not
/// replaced.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("endpoints.graph", DEFAULT_GRAPH_ENDPOINT)?
        .set_default("endpoints.yammer", DEFAULT_YAMMER_ENDPOINT)?
        .set_default("endpoints.azure_management", DEFAULT_AZURE_MANAGEMENT_ENDPOINT)?
        .set_default("http.connect_timeout_secs", 10)?
        .set_default("http.request_timeout_secs", 60)?
        .set_default("output.format", "json")
}
