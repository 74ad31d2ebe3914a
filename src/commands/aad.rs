//! `aad o365group teamify`

use super::{collection, encode, encode_query_parameter, single_id};
use crate::args::ParsedArgs;
use crate::config::EndpointConfig;
use crate::error::SpecError;
use crate::executor::{Command, CommandContext};
use crate::normalize::RawRejection;
use crate::options::{CommandSpec, OptionSet};
use crate::transport::{Request, ACCEPT_JSON_NO_METADATA};
use crate::validation::rules::{guid_message, is_valid_guid};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct TeamifyCommand {
    spec: CommandSpec,
}

impl TeamifyCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("aad o365group teamify", "Creates a new Microsoft Teams team under existing Microsoft 365 group")
            .track_presence(&["group-id", "mail-nickname"])
            .declare(&[
                ("-i, --group-id [groupId]", "The ID of the Microsoft 365 Group to connect to Microsoft Teams"),
                ("--mail-nickname [mailNickname]", "The mail alias of the Microsoft 365 Group to connect to Microsoft Teams"),
            ])
            .validate_with(|args| match args.text("group-id") {
                Some(id) if !is_valid_guid(id) => Err(guid_message(id)),
                _ => Ok(()),
            })
            .declare_sets([OptionSet::exactly_one(["group-id", "mail-nickname"])])
            .build()?;
        Ok(Self { spec })
    }

    async fn group_id(ctx: &CommandContext<'_>, args: &ParsedArgs) -> Result<String, RawRejection> {
        if let Some(id) = args.text("group-id") {
            return Ok(id.to_string());
        }
        let nickname = args.text("mail-nickname").unwrap_or_default();
        let url = EndpointConfig::join(
            &ctx.endpoints.graph,
            &format!(
                "v1.0/groups?$filter=mailNickname eq '{}'",
                encode_query_parameter(nickname)
            ),
        );
        let body = ctx.send(Request::get(url).accept(ACCEPT_JSON_NO_METADATA)).await?;
        single_id(
            collection(&body),
            || "The specified Microsoft 365 Group does not exist".to_string(),
            |ids| {
                format!(
                    "Multiple Microsoft 365 Groups with name {} found: {}",
                    nickname,
                    ids.join(",")
                )
            },
        )
    }
}

/// Team settings applied when a group is converted.
fn team_settings() -> Value {
    json!({
        "memberSettings": {
            "allowCreatePrivateChannels": true,
            "allowCreateUpdateChannels": true
        },
        "messagingSettings": {
            "allowUserEditMessages": true,
            "allowUserDeleteMessages": true
        },
        "funSettings": {
            "allowGiphy": true,
            "giphyContentRating": "strict"
        }
    })
}

#[async_trait]
impl Command for TeamifyCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let group_id = Self::group_id(ctx, args).await?;
        let url = EndpointConfig::join(
            &ctx.endpoints.graph,
            &format!("v1.0/groups/{}/team", encode(&group_id)),
        );
        ctx.send(
            Request::put(url)
                .accept(ACCEPT_JSON_NO_METADATA)
                .json(team_settings()),
        )
        .await?;
        Ok(None)
    }
}
