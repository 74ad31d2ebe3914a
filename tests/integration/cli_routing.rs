//! Command lines routed through `RunContext` with scripted collaborators.

use crate::integration::test_utils::{invalid_request, tokens, ScriptedPrompter, ScriptedTransport};
use clap::Parser;
use serde_json::{json, Value};
use std::sync::Arc;
use tenantctl::cli::{Cli, RunContext};
use tenantctl::config::AppConfig;
use tenantctl::error::{CommandError, ErrorKind};
use tenantctl::transport::{Method, ResponseBody};

const FLOW_RUN: &str = "https://management.azure.com/providers/Microsoft.ProcessSimple/environments/Default-d87a7535-dd31-4437-bfe1-95340acd55c5/flows/0f64d9dd-01bb-4c1b-95b3-cb4a1a08ac72/runs/08586653536760200319026785874CU62?api-version=2016-11-01";

fn service() -> Arc<ScriptedTransport> {
    ScriptedTransport::new(|request| match request.url.as_str() {
        "https://www.yammer.com/api/v1/search.json?search=contents&page=1" => {
            Ok(ResponseBody::Json(json!({
                "count": { "messages": 1, "groups": 0, "topics": 0, "users": 1 },
                "messages": { "messages": [ { "id": 11111, "content_excerpt": "hello" } ] },
                "groups": [],
                "topics": [],
                "users": [ { "id": 4441, "full_name": "Adele Vance" } ]
            })))
        }
        FLOW_RUN => Ok(ResponseBody::Json(json!({
            "name": "08586653536760200319026785874CU62",
            "id": "/providers/Microsoft.ProcessSimple/runs/08586653536760200319026785874CU62",
            "properties": {
                "startTime": "2018-09-07T19:05:31.7Z",
                "endTime": "2018-09-07T19:06:02.3Z",
                "status": "Succeeded",
                "trigger": { "name": "manual" }
            }
        }))),
        _ => invalid_request(),
    })
}

async fn execute_with(
    config: &AppConfig,
    transport: Arc<ScriptedTransport>,
    prompter: Arc<ScriptedPrompter>,
    line: &[&str],
) -> Result<String, CommandError> {
    let cli = Cli::try_parse_from(std::iter::once("tenantctl").chain(line.iter().copied())).unwrap();
    let context = RunContext::with_parts(config, Box::new(tokens()), transport, prompter)?;
    context.execute(&cli).await
}

async fn execute(line: &[&str]) -> Result<String, CommandError> {
    execute_with(
        &AppConfig::default(),
        service(),
        ScriptedPrompter::answering(true),
        line,
    )
    .await
}

#[tokio::test]
async fn test_yammer_search_json_by_default_includes_summary() {
    let out = execute(&["yammer", "search", "--query-text", "contents"]).await.unwrap();
    let result: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(
        result["summary"],
        json!({ "messages": 1, "groups": 0, "topics": 0, "users": 1 })
    );
    assert_eq!(result["messages"][0]["id"], 11111);
    assert_eq!(result["users"][0]["full_name"], "Adele Vance");
    assert_eq!(result["topics"], json!([]));
    assert_eq!(result["groups"], json!([]));
}

#[tokio::test]
async fn test_show_with_default_json_output_is_rejected() {
    let transport = service();
    let err = execute_with(
        &AppConfig::default(),
        transport.clone(),
        ScriptedPrompter::answering(true),
        &["yammer", "search", "--query-text", "contents", "--show", "summary"],
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "json output cannot be used when using the show option");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_yammer_search_text_table() {
    let out = execute(&["yammer", "search", "--query-text", "contents", "-o", "text"])
        .await
        .unwrap();

    assert!(out.contains("11111"));
    assert!(out.contains("Adele Vance"));
    assert!(out.contains("description"));
}

#[tokio::test]
async fn test_text_from_config_default() {
    let mut config = AppConfig::default();
    config.output.format = "text".to_string();
    let out = execute_with(
        &config,
        service(),
        ScriptedPrompter::answering(true),
        &["yammer", "search", "--query-text", "contents", "--show", "summary"],
    )
    .await
    .unwrap();

    assert!(out.lines().any(|line| line == "messages: 1"));
}

#[tokio::test]
async fn test_show_with_explicit_json_is_rejected() {
    let err = execute(&[
        "yammer",
        "search",
        "--query-text",
        "contents",
        "--show",
        "summary",
        "-o",
        "json",
    ])
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "json output cannot be used when using the show option");
}

#[tokio::test]
async fn test_flow_run_text_uses_default_properties() {
    let out = execute(&[
        "flow",
        "run",
        "get",
        "-e",
        "Default-d87a7535-dd31-4437-bfe1-95340acd55c5",
        "-f",
        "0f64d9dd-01bb-4c1b-95b3-cb4a1a08ac72",
        "-n",
        "08586653536760200319026785874CU62",
        "--output",
        "text",
    ])
    .await
    .unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "name: 08586653536760200319026785874CU62",
            "startTime: 2018-09-07T19:05:31.7Z",
            "endTime: 2018-09-07T19:06:02.3Z",
            "status: Succeeded",
            "triggerName: manual",
        ]
    );
}

#[tokio::test]
async fn test_invalid_output_type() {
    let err = execute(&["yammer", "search", "--query-text", "contents", "-o", "yaml"])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "Invalid output type: yaml (must be 'json' or 'text')"
    );
}

#[tokio::test]
async fn test_missing_required_option() {
    let err = execute(&["yammer", "search"]).await.unwrap_err();
    assert_eq!(err.to_string(), "Required option query-text not specified");
}

#[tokio::test]
async fn test_declined_removal_prints_nothing() {
    let transport = service();
    let out = execute_with(
        &AppConfig::default(),
        transport.clone(),
        ScriptedPrompter::answering(false),
        &[
            "spo",
            "site",
            "apppermission",
            "remove",
            "-u",
            "https://contoso.sharepoint.com/sites/sitecollection-name",
            "--app-display-name",
            "Foo",
        ],
    )
    .await
    .unwrap();

    assert_eq!(out, "");
    assert!(transport.urls(Method::Delete).is_empty());
}
