//! `teams tab get`, `teams app publish`

use super::{collection, encode, encode_query_parameter, single_id};
use crate::args::ParsedArgs;
use crate::config::EndpointConfig;
use crate::error::SpecError;
use crate::executor::{Command, CommandContext};
use crate::normalize::RawRejection;
use crate::options::{CommandSpec, OptionSet};
use crate::transport::{Request, ACCEPT_JSON_NO_METADATA};
use crate::validation::rules::{guid_message, is_valid_guid, is_valid_teams_channel_id};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub struct TabGetCommand {
    spec: CommandSpec,
}

impl TabGetCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("teams tab get", "Gets information about the specified Microsoft Teams tab")
            .track_presence(&["team-id", "team-name", "channel-id", "channel-name", "tab-id", "tab-name"])
            .declare(&[
                ("--team-id [teamId]", "The ID of the team where the tab exists"),
                ("--team-name [teamName]", "The display name of the team where the tab exists"),
                ("--channel-id [channelId]", "The ID of the channel for which to retrieve more information"),
                ("--channel-name [channelName]", "The display name of the channel for which to retrieve more information"),
                ("-i, --tab-id [tabId]", "The ID of the Microsoft Teams tab"),
                ("-n, --tab-name [tabName]", "The display name of the Microsoft Teams tab"),
            ])
            .validate_with(|args| {
                if let Some(team_id) = args.text("team-id") {
                    if !is_valid_guid(team_id) {
                        return Err(guid_message(team_id));
                    }
                }
                if let Some(channel_id) = args.text("channel-id") {
                    if !is_valid_teams_channel_id(channel_id) {
                        return Err(format!("{} is not a valid Teams ChannelId", channel_id));
                    }
                }
                if let Some(tab_id) = args.text("tab-id") {
                    if !is_valid_guid(tab_id) {
                        return Err(guid_message(tab_id));
                    }
                }
                Ok(())
            })
            .declare_sets([
                OptionSet::exactly_one(["team-id", "team-name"]),
                OptionSet::exactly_one(["channel-id", "channel-name"]),
                OptionSet::exactly_one(["tab-id", "tab-name"]),
            ])
            .build()?;
        Ok(Self { spec })
    }

    async fn team_id(ctx: &CommandContext<'_>, args: &ParsedArgs) -> Result<String, RawRejection> {
        if let Some(id) = args.text("team-id") {
            return Ok(id.to_string());
        }
        let name = args.text("team-name").unwrap_or_default();
        let url = graph(
            ctx,
            &format!(
                "v1.0/groups?$filter=displayName eq '{}'",
                encode_query_parameter(name)
            ),
        );
        let body = ctx.send(Request::get(url).accept(ACCEPT_JSON_NO_METADATA)).await?;
        let groups = collection(&body);
        let id = single_id(
            groups,
            || format!("The specified group '{}' does not exist", name),
            |ids| format!("Multiple groups with name '{}' found: {}", name, ids.join(",")),
        )?;

        let is_team = groups[0]
            .get("resourceProvisioningOptions")
            .and_then(Value::as_array)
            .is_some_and(|options| options.iter().any(|o| o == "Team"));
        if !is_team {
            return Err(RawRejection::message(
                "The specified team does not exist in the Microsoft Teams",
            ));
        }
        Ok(id)
    }

    async fn lookup_by_name(
        ctx: &CommandContext<'_>,
        path: String,
        name: &str,
        not_found: &str,
    ) -> Result<String, RawRejection> {
        let url = graph(
            ctx,
            &format!("{}?$filter=displayName eq '{}'", path, encode_query_parameter(name)),
        );
        let body = ctx.send(Request::get(url).accept(ACCEPT_JSON_NO_METADATA)).await?;
        collection(&body)
            .first()
            .and_then(super::id_of)
            .ok_or_else(|| RawRejection::message(not_found))
    }
}

fn graph(ctx: &CommandContext<'_>, path: &str) -> String {
    EndpointConfig::join(&ctx.endpoints.graph, path)
}

#[async_trait]
impl Command for TabGetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let team_id = Self::team_id(ctx, args).await?;
        let teams_path = format!("v1.0/teams/{}/channels", encode(&team_id));

        let channel_id = match args.text("channel-id") {
            Some(id) => id.to_string(),
            None => {
                Self::lookup_by_name(
                    ctx,
                    teams_path.clone(),
                    args.text("channel-name").unwrap_or_default(),
                    "The specified channel does not exist in the Microsoft Teams team",
                )
                .await?
            }
        };
        let tabs_path = format!("{}/{}/tabs", teams_path, encode(&channel_id));

        let tab_id = match args.text("tab-id") {
            Some(id) => id.to_string(),
            None => {
                Self::lookup_by_name(
                    ctx,
                    tabs_path.clone(),
                    args.text("tab-name").unwrap_or_default(),
                    "The specified tab does not exist in the Microsoft Teams team channel",
                )
                .await?
            }
        };

        let url = graph(ctx, &format!("{}/{}", tabs_path, encode(&tab_id)));
        let tab = ctx.send(Request::get(url).accept(ACCEPT_JSON_NO_METADATA)).await?;
        Ok(Some(tab))
    }
}

pub struct AppPublishCommand {
    spec: CommandSpec,
}

impl AppPublishCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("teams app publish", "Publishes Teams app to the organization's app catalog")
            .declare(&[(
                "-p, --file-path <filePath>",
                "Absolute or relative path to the Teams manifest zip file to add to the app catalog",
            )])
            .validate_with(|args| {
                let Some(file_path) = args.text("file-path") else {
                    return Ok(());
                };
                let path = Path::new(file_path);
                if !path.exists() {
                    return Err(format!("File '{}' not found", file_path));
                }
                if path.is_dir() {
                    return Err(format!("Path '{}' points to a directory", file_path));
                }
                Ok(())
            })
            .build()?;
        Ok(Self { spec })
    }
}

#[async_trait]
impl Command for AppPublishCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let file_path = args.text("file-path").unwrap_or_default();
        let package = tokio::fs::read(file_path).await?;
        debug!(file_path, bytes = package.len(), "Publishing app package");

        let request = Request::post(graph(ctx, "v1.0/appCatalogs/teamsApps"))
            .header("content-type", "application/zip")
            .bytes(package);
        let app = ctx.send(request).await?;
        Ok(app.get("id").cloned())
    }
}
