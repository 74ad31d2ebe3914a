//! `yammer search` through the executor with a scripted Yammer endpoint.

use crate::integration::test_utils::{executor, invalid_request, ScriptedPrompter, ScriptedTransport};
use serde_json::{json, Value};
use tenantctl::args::ParsedArgs;
use tenantctl::commands::yammer::SearchCommand;
use tenantctl::error::ErrorKind;
use tenantctl::executor::Outcome;
use tenantctl::normalize::RawRejection;
use tenantctl::transport::{Method, ResponseBody};

const PAGE_1: &str = "https://www.yammer.com/api/v1/search.json?search=contents&page=1";
const PAGE_2: &str = "https://www.yammer.com/api/v1/search.json?search=contents&page=2";

fn ids(items: &[u64]) -> Vec<Value> {
    items.iter().map(|id| json!({ "id": id })).collect()
}

fn search_results() -> Value {
    json!({
        "count": { "messages": 4, "groups": 2, "topics": 5, "users": 4 },
        "messages": { "messages": ids(&[11111, 11112, 11113, 11114]) },
        "groups": ids(&[2221, 2222]),
        "topics": ids(&[3331, 3332, 3333, 3334, 3335]),
        "users": ids(&[4441, 4442, 4443, 4444])
    })
}

/// 24 messages split evenly over two pages.
fn long_result(page: u64) -> Value {
    let first = 11115 + (page - 1) * 12;
    let messages: Vec<u64> = (first..first + 12).collect();
    json!({
        "count": { "messages": 24, "groups": 0, "topics": 0, "users": 0 },
        "messages": { "messages": ids(&messages) },
        "groups": [],
        "topics": [],
        "users": []
    })
}

fn message_trimming() -> Value {
    json!({
        "count": { "messages": 4, "groups": 0, "topics": 0, "users": 0 },
        "messages": {
            "messages": [
                { "id": 11111, "content_excerpt": "this is a very long message. Longer than 80 chars. ".repeat(6) },
                { "id": 11112, "content_excerpt": "short" },
                { "id": 11113 },
                { "id": 11114, "content_excerpt": "shortmessage" }
            ]
        },
        "groups": [],
        "topics": [],
        "users": []
    })
}

fn serve(pages: Vec<Value>) -> std::sync::Arc<ScriptedTransport> {
    ScriptedTransport::new(move |request| {
        let index = match request.url.as_str() {
            PAGE_1 => 0,
            PAGE_2 => 1,
            _ => return invalid_request(),
        };
        match pages.get(index) {
            Some(page) => Ok(ResponseBody::Json(page.clone())),
            None => invalid_request(),
        }
    })
}

async fn run(transport: std::sync::Arc<ScriptedTransport>, args: ParsedArgs) -> Value {
    let command = SearchCommand::new().unwrap();
    let outcome = executor(transport, ScriptedPrompter::answering(true))
        .run(&command, &args)
        .await
        .unwrap();
    match outcome {
        Outcome::Completed(Some(value)) => value,
        other => panic!("unexpected outcome {:?}", other),
    }
}

fn row_ids(rows: &Value) -> Vec<u64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_returns_all_items_in_category_order() {
    let transport = serve(vec![search_results()]);
    let rows = run(transport.clone(), ParsedArgs::new().with("query-text", "contents")).await;

    assert_eq!(
        row_ids(&rows),
        vec![
            11111, 11112, 11113, 11114, 3331, 3332, 3333, 3334, 3335, 4441, 4442, 4443, 4444,
            2221, 2222
        ]
    );
    assert_eq!(rows[0]["type"], "message");
    assert_eq!(rows[14]["type"], "group");
    assert_eq!(transport.urls(Method::Get), vec![PAGE_1.to_string()]);
}

#[tokio::test]
async fn test_long_result_takes_exactly_two_pages() {
    let transport = serve(vec![long_result(1), long_result(2)]);
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("show", "messages");
    let rows = run(transport.clone(), args).await;

    assert_eq!(rows.as_array().unwrap().len(), 24);
    assert_eq!(
        transport.urls(Method::Get),
        vec![PAGE_1.to_string(), PAGE_2.to_string()]
    );
}

#[tokio::test]
async fn test_summary_uses_first_page_counts() {
    let transport = serve(vec![search_results()]);
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("show", "summary");
    let summary = run(transport.clone(), args).await;

    assert_eq!(summary, json!({"messages": 4, "groups": 2, "topics": 5, "users": 4}));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_single_category_filter() {
    let transport = serve(vec![search_results()]);
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("show", "topics");
    let rows = run(transport, args).await;
    assert_eq!(row_ids(&rows), vec![3331, 3332, 3333, 3334, 3335]);
}

#[tokio::test]
async fn test_limit_truncates_every_category() {
    let transport = serve(vec![search_results()]);
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("limit", 1u64)
        .with("output", "json");
    let result = run(transport.clone(), args).await;

    assert_eq!(result["summary"]["messages"], 4);
    assert_eq!(result["summary"]["groups"], 2);
    assert_eq!(result["summary"]["topics"], 5);
    assert_eq!(result["summary"]["users"], 4);
    for category in ["messages", "groups", "topics", "users"] {
        assert_eq!(result[category].as_array().unwrap().len(), 1, "{}", category);
    }
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_json_output_without_limit() {
    let transport = serve(vec![search_results()]);
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("output", "json");
    let result = run(transport, args).await;

    assert_eq!(result["messages"].as_array().unwrap().len(), 4);
    assert_eq!(result["groups"].as_array().unwrap().len(), 2);
    assert_eq!(result["topics"].as_array().unwrap().len(), 5);
    assert_eq!(result["users"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_trims_message_excerpts() {
    let transport = serve(vec![message_trimming()]);
    let rows = run(transport, ParsedArgs::new().with("query-text", "contents")).await;
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["description"].as_str().unwrap().chars().count(), 83);
    assert_eq!(rows[1]["description"], "short");
    assert!(rows[2].get("description").is_none());
    assert_eq!(rows[3]["description"].as_str().unwrap().len(), 12);
}

#[tokio::test]
async fn test_error_in_page_loop_discards_results() {
    let transport = ScriptedTransport::new(|request| match request.url.as_str() {
        PAGE_1 => Ok(ResponseBody::Json(long_result(1))),
        PAGE_2 => Err(RawRejection::Payload(json!({"error": {"base": "An error has occurred."}}))),
        _ => invalid_request(),
    });
    let command = SearchCommand::new().unwrap();
    let args = ParsedArgs::new()
        .with("query-text", "contents")
        .with("output", "json");
    let err = executor(transport, ScriptedPrompter::answering(true))
        .run(&command, &args)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "An error has occurred.");
    assert_eq!(err.kind(), ErrorKind::Aggregation);
}

#[tokio::test]
async fn test_first_page_error() {
    let transport = ScriptedTransport::new(|_| {
        Err(RawRejection::Payload(json!({"error": {"base": "An error has occurred."}})))
    });
    let command = SearchCommand::new().unwrap();
    let err = executor(transport, ScriptedPrompter::answering(true))
        .run(&command, &ParsedArgs::new().with("query-text", "contents"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "An error has occurred.");
}
