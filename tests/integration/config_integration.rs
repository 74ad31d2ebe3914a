//! Integration tests for configuration layering

use crate::integration::test_utils::with_config_env;
use std::fs;
use tempfile::TempDir;
use tenantctl::config::ConfigLoader;
use tenantctl::error::ErrorKind;

fn write_global(dir: &TempDir, contents: &str) {
    let config_dir = dir.path().join("tenantctl");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let dir = TempDir::new().unwrap();
    let config = with_config_env(&dir, &[], || ConfigLoader::load(None)).unwrap();

    assert_eq!(config.endpoints.graph, "https://graph.microsoft.com");
    assert_eq!(config.endpoints.yammer, "https://www.yammer.com/api");
    assert_eq!(config.http.connect_timeout_secs, 10);
    assert_eq!(config.output.format, "json");
}

#[test]
fn test_global_file_is_picked_up() {
    let dir = TempDir::new().unwrap();
    write_global(
        &dir,
        r#"
[endpoints]
graph = "https://graph.example.test"

[output]
format = "text"
"#,
    );

    let config = with_config_env(&dir, &[], || ConfigLoader::load(None)).unwrap();
    assert_eq!(config.endpoints.graph, "https://graph.example.test");
    assert_eq!(config.output.format, "text");
    assert_eq!(
        config.endpoints.azure_management,
        "https://management.azure.com"
    );
}

#[test]
fn test_explicit_file_overrides_global_and_env_overrides_both() {
    let dir = TempDir::new().unwrap();
    write_global(
        &dir,
        r#"
[http]
request_timeout_secs = 30
connect_timeout_secs = 3
"#,
    );
    let explicit = dir.path().join("project.toml");
    fs::write(
        &explicit,
        r#"
[http]
request_timeout_secs = 45

[auth]
access_token = "from-file"
"#,
    )
    .unwrap();

    let config = with_config_env(
        &dir,
        &[("TENANTCTL_HTTP__CONNECT_TIMEOUT_SECS", "7")],
        || ConfigLoader::load(Some(&explicit)),
    )
    .unwrap();

    assert_eq!(config.http.request_timeout_secs, 45);
    assert_eq!(config.http.connect_timeout_secs, 7);
    assert_eq!(config.auth.access_token.as_deref(), Some("from-file"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = with_config_env(&dir, &[], || ConfigLoader::load(Some(&missing))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().starts_with("Config file not found"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    write_global(
        &dir,
        r#"
[endpoints]
graph = "ftp://graph.example.test"

[output]
format = "yaml"
"#,
    );

    let err = with_config_env(&dir, &[], || ConfigLoader::load(None)).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Configuration validation failed"));
    assert!(message.contains("graph"));
    assert!(message.contains("yaml"));
}

#[test]
fn test_load_from_file_ignores_environment() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("only.toml");
    fs::write(&file, "[http]\nrequest_timeout_secs = 12\n").unwrap();

    let config = with_config_env(
        &dir,
        &[("TENANTCTL_HTTP__REQUEST_TIMEOUT_SECS", "99")],
        || ConfigLoader::load_from_file(&file),
    )
    .unwrap();
    assert_eq!(config.http.request_timeout_secs, 12);
}
