//! `spo site apppermission remove`: confirmation and permission matching.

use crate::integration::test_utils::{executor, invalid_request, ScriptedPrompter, ScriptedTransport};
use serde_json::{json, Value};
use std::sync::Arc;
use tenantctl::args::ParsedArgs;
use tenantctl::commands::spo::AppPermissionRemoveCommand;
use tenantctl::error::ErrorKind;
use tenantctl::executor::Outcome;
use tenantctl::normalize::RawRejection;
use tenantctl::transport::{Method, ResponseBody};

const SITE_URL: &str = "https://contoso.sharepoint.com/sites/sitecollection-name";
const SITE_LOOKUP: &str =
    "https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com:/sites/sitecollection-name";
const SITE_ID: &str = "contoso.sharepoint.com,00000000-0000-0000-0000-000000000000,00000000-0000-0000-0000-000000000001";
const APP_ID: &str = "89ea5c94-7736-4e25-95ad-3fa95f62b66e";
const PERMISSION_ID: &str = "aTowaS50fG1zLnNwLmV4dHw4OWVhNWM5NC03NzM2LTRlMjUtOTVhZC0zZmE5NWY2MmI2NmVAZGU3ZDYyZjAtNDg2MC00ODg4LWE1MjYtZDBhY2FhNTk0NzIx";

fn permissions_url() -> String {
    format!("https://graph.microsoft.com/v1.0/sites/{}/permissions", SITE_ID)
}

fn permission_url(id: &str) -> String {
    format!("{}/{}", permissions_url(), id)
}

fn permissions() -> Value {
    json!({
        "value": [
            {
                "id": PERMISSION_ID,
                "grantedToIdentities": [
                    { "application": { "displayName": "Foo", "id": APP_ID } }
                ]
            },
            {
                "id": "other-permission",
                "grantedToIdentities": [
                    { "application": { "displayName": "Bar", "id": "fc4c9ae1-a07a-4e5a-bd1f-96d0b8e40a31" } }
                ]
            }
        ]
    })
}

fn site_service() -> Arc<ScriptedTransport> {
    ScriptedTransport::new(|request| {
        let url = request.url.as_str();
        match request.method {
            Method::Get if url == SITE_LOOKUP => Ok(ResponseBody::Json(json!({ "id": SITE_ID }))),
            Method::Get if url == permissions_url() => Ok(ResponseBody::Json(permissions())),
            Method::Delete if url.starts_with(&permissions_url()) => Ok(ResponseBody::Empty),
            _ => invalid_request(),
        }
    })
}

fn remove_by_name() -> ParsedArgs {
    ParsedArgs::new()
        .with("site-url", SITE_URL)
        .with("app-display-name", "Foo")
}

#[tokio::test]
async fn test_prompts_before_removing() {
    let transport = site_service();
    let prompter = ScriptedPrompter::answering(false);
    let command = AppPermissionRemoveCommand::new().unwrap();

    let outcome = executor(transport.clone(), prompter.clone())
        .run(&command, &remove_by_name())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Declined);
    assert_eq!(
        prompter.asked(),
        vec![format!(
            "Are you sure you want to remove the specified application permission from site {}?",
            SITE_URL
        )]
    );
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_confirmed_prompt_removes_matching_permission() {
    let transport = site_service();
    let command = AppPermissionRemoveCommand::new().unwrap();

    let outcome = executor(transport.clone(), ScriptedPrompter::answering(true))
        .run(&command, &remove_by_name())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed(None));
    assert_eq!(transport.urls(Method::Delete), vec![permission_url(PERMISSION_ID)]);
}

#[tokio::test]
async fn test_confirm_flag_skips_prompt_and_matches_app_id() {
    let transport = site_service();
    let prompter = ScriptedPrompter::answering(false);
    let command = AppPermissionRemoveCommand::new().unwrap();
    let args = ParsedArgs::new()
        .with("site-url", SITE_URL)
        .with("app-id", APP_ID)
        .with_switch("confirm", true);

    executor(transport.clone(), prompter.clone())
        .run(&command, &args)
        .await
        .unwrap();

    assert!(prompter.asked().is_empty());
    assert_eq!(transport.urls(Method::Delete), vec![permission_url(PERMISSION_ID)]);
}

#[tokio::test]
async fn test_permission_id_skips_listing() {
    let transport = site_service();
    let command = AppPermissionRemoveCommand::new().unwrap();
    let args = ParsedArgs::new()
        .with("site-url", SITE_URL)
        .with("permission-id", PERMISSION_ID)
        .with_switch("confirm", true);

    executor(transport.clone(), ScriptedPrompter::answering(true))
        .run(&command, &args)
        .await
        .unwrap();

    assert_eq!(transport.urls(Method::Get), vec![SITE_LOOKUP.to_string()]);
    assert_eq!(transport.urls(Method::Delete), vec![permission_url(PERMISSION_ID)]);
}

#[tokio::test]
async fn test_no_matching_permission_deletes_nothing() {
    let transport = site_service();
    let command = AppPermissionRemoveCommand::new().unwrap();
    let args = ParsedArgs::new()
        .with("site-url", SITE_URL)
        .with("app-display-name", "Baz")
        .with_switch("confirm", true);

    let outcome = executor(transport.clone(), ScriptedPrompter::answering(true))
        .run(&command, &args)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed(None));
    assert!(transport.urls(Method::Delete).is_empty());
}

#[tokio::test]
async fn test_plain_string_rejection_becomes_message() {
    let transport = ScriptedTransport::new(|_| {
        Err(RawRejection::Payload(Value::String("An error has occurred".to_string())))
    });
    let command = AppPermissionRemoveCommand::new().unwrap();
    let args = remove_by_name().with_switch("confirm", true);

    let err = executor(transport, ScriptedPrompter::answering(true))
        .run(&command, &args)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "An error has occurred");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_invalid_app_id_never_reaches_prompt() {
    let transport = site_service();
    let prompter = ScriptedPrompter::answering(true);
    let command = AppPermissionRemoveCommand::new().unwrap();
    let args = ParsedArgs::new()
        .with("site-url", SITE_URL)
        .with("app-id", "123");

    let err = executor(transport.clone(), prompter.clone())
        .run(&command, &args)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("123"));
    assert!(prompter.asked().is_empty());
    assert!(transport.requests().is_empty());
}
