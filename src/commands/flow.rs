//! `flow run get`

use super::encode;
use crate::args::ParsedArgs;
use crate::config::EndpointConfig;
use crate::error::SpecError;
use crate::executor::{Command, CommandContext};
use crate::normalize::RawRejection;
use crate::options::CommandSpec;
use crate::transport::Request;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

const API_VERSION: &str = "2016-11-01";

pub struct RunGetCommand {
    spec: CommandSpec,
}

impl RunGetCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("flow run get", "Gets information about a specific run of the specified Microsoft Flow")
            .declare(&[
                ("-n, --name <name>", "The name of the run to get information about"),
                ("-f, --flow <flow>", "The name of the Microsoft Flow for which to retrieve information"),
                ("-e, --environment <environment>", "The name of the environment where the flow is located"),
            ])
            .default_properties(&["name", "startTime", "endTime", "status", "triggerName"])
            .build()?;
        Ok(Self { spec })
    }
}

/// Lift the interesting run properties to the top level.
pub fn flatten_run(mut run: Value) -> Value {
    let property = |run: &Value, pointer: &str| run.pointer(pointer).cloned().unwrap_or(Value::Null);
    let start_time = property(&run, "/properties/startTime");
    let end_time = match property(&run, "/properties/endTime") {
        Value::Null => Value::String(String::new()),
        end => end,
    };
    let status = property(&run, "/properties/status");
    let trigger_name = property(&run, "/properties/trigger/name");

    if let Some(fields) = run.as_object_mut() {
        fields.insert("startTime".to_string(), start_time);
        fields.insert("endTime".to_string(), end_time);
        fields.insert("status".to_string(), status);
        fields.insert("triggerName".to_string(), trigger_name);
    }
    run
}

#[async_trait]
impl Command for RunGetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let name = args.text("name").unwrap_or_default();
        let flow = args.text("flow").unwrap_or_default();
        let environment = args.text("environment").unwrap_or_default();
        if args.verbose() {
            info!(run = name, flow, "Retrieving information about flow run");
        }

        let url = EndpointConfig::join(
            &ctx.endpoints.azure_management,
            &format!(
                "providers/Microsoft.ProcessSimple/environments/{}/flows/{}/runs/{}?api-version={}",
                encode(environment),
                encode(flow),
                encode(name),
                API_VERSION
            ),
        );
        let run = ctx.send(Request::get(url).accept("application/json")).await?;
        Ok(Some(flatten_run(run)))
    }
}
