//! `yammer search`

use crate::args::{OptionValue, ParsedArgs};
use crate::config::EndpointConfig;
use crate::error::SpecError;
use crate::executor::{Command, CommandContext};
use crate::normalize::RawRejection;
use crate::options::CommandSpec;
use crate::paging::{trim_display_text, Aggregation, Aggregator, Page, PageCursor};
use crate::transport::Request;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Result categories in the order text output lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchCategory {
    Messages,
    Topics,
    Users,
    Groups,
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 4] = [
        SearchCategory::Messages,
        SearchCategory::Topics,
        SearchCategory::Users,
        SearchCategory::Groups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchCategory::Messages => "messages",
            SearchCategory::Topics => "topics",
            SearchCategory::Users => "users",
            SearchCategory::Groups => "groups",
        }
    }

    fn row_type(self) -> &'static str {
        match self {
            SearchCategory::Messages => "message",
            SearchCategory::Topics => "topic",
            SearchCategory::Users => "user",
            SearchCategory::Groups => "group",
        }
    }

    /// Field shown as a row's description.
    fn description_field(self) -> &'static str {
        match self {
            SearchCategory::Messages => "content_excerpt",
            SearchCategory::Topics => "name",
            SearchCategory::Users => "full_name",
            SearchCategory::Groups => "full_name",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// What `--show` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Show {
    All,
    Summary,
    Only(SearchCategory),
}

impl Show {
    fn from_args(args: &ParsedArgs) -> Self {
        match args.text("show") {
            None => Show::All,
            Some("summary") => Show::Summary,
            Some(other) => SearchCategory::parse(other).map(Show::Only).unwrap_or(Show::All),
        }
    }

    fn tracked(self) -> Vec<SearchCategory> {
        match self {
            Show::All => SearchCategory::ALL.to_vec(),
            Show::Summary => Vec::new(),
            Show::Only(category) => vec![category],
        }
    }
}

const SHOW_VALUES: [&str; 5] = ["summary", "messages", "users", "topics", "groups"];

#[derive(Debug, Default, Deserialize)]
struct SearchCounts {
    #[serde(default)]
    messages: usize,
    #[serde(default)]
    groups: usize,
    #[serde(default)]
    topics: usize,
    #[serde(default)]
    users: usize,
}

#[derive(Debug, Default, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    count: SearchCounts,
    #[serde(default)]
    messages: MessageList,
    #[serde(default)]
    topics: Vec<Value>,
    #[serde(default)]
    users: Vec<Value>,
    #[serde(default)]
    groups: Vec<Value>,
}

impl SearchPage {
    fn into_page(self) -> Page<SearchCategory, Value> {
        let totals = BTreeMap::from([
            (SearchCategory::Messages, self.count.messages),
            (SearchCategory::Topics, self.count.topics),
            (SearchCategory::Users, self.count.users),
            (SearchCategory::Groups, self.count.groups),
        ]);
        let items = BTreeMap::from([
            (SearchCategory::Messages, self.messages.messages),
            (SearchCategory::Topics, self.topics),
            (SearchCategory::Users, self.users),
            (SearchCategory::Groups, self.groups),
        ]);
        Page { items, totals }
    }
}

/// One line of text output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

pub struct SearchCommand {
    spec: CommandSpec,
}

impl SearchCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("yammer search", "Returns a list of messages, topics and users which match the query")
            .telemetry(|args, properties| {
                let show = args.text("show").map(str::to_string);
                properties.insert("show".to_string(), show.map(Value::String).unwrap_or(Value::Null));
                properties.insert("limit".to_string(), Value::Bool(args.is_present("limit")));
            })
            .declare(&[
                ("--query-text <queryText>", "The query for the search"),
                ("--show [show]", "Results to show. Allowed values: summary, messages, users, topics, groups"),
                ("--limit [limit]", "Limits the results to the specified number of entries per category"),
            ])
            .validate_with(|args| match args.get("query-text") {
                Some(OptionValue::Text(_)) | None => Ok(()),
                Some(other) => Err(format!("{} is not a valid value for query-text; specify text", other)),
            })
            .validate_with(|args| match args.text("show") {
                Some(show) if !SHOW_VALUES.contains(&show) => Err(format!(
                    "{} is not a valid value for the show option. Allowed values are {}",
                    show,
                    SHOW_VALUES.join("|")
                )),
                Some(_) if args.output() == Some("json") => {
                    Err("json output cannot be used when using the show option".to_string())
                }
                _ => Ok(()),
            })
            .validate_with(|args| match args.get("limit") {
                Some(value) if !args.as_u64("limit").is_some_and(|limit| limit > 0) => {
                    Err(format!("{} is not a valid number", value))
                }
                _ => Ok(()),
            })
            .build()?;
        Ok(Self { spec })
    }
}

fn search_url(endpoints: &EndpointConfig, query: &str, cursor: PageCursor) -> String {
    EndpointConfig::join(
        &endpoints.yammer,
        &format!(
            "v1/search.json?search={}&page={}",
            super::encode(query),
            cursor.page()
        ),
    )
}

fn summary(aggregation: &Aggregation<SearchCategory, Value>) -> Value {
    let mut summary = Map::new();
    for category in SearchCategory::ALL {
        summary.insert(category.as_str().to_string(), json!(aggregation.total(&category)));
    }
    Value::Object(summary)
}

/// Flatten buckets into display rows, trimming message excerpts.
pub fn rows(aggregation: &mut Aggregation<SearchCategory, Value>) -> Vec<SearchRow> {
    let mut rows = Vec::new();
    for category in SearchCategory::ALL {
        for item in aggregation.take(&category) {
            let description = item.get(category.description_field()).and_then(Value::as_str);
            let description = if category == SearchCategory::Messages {
                trim_display_text(description)
            } else {
                description.map(str::to_string)
            };
            rows.push(SearchRow {
                id: item.get("id").cloned().unwrap_or(Value::Null),
                description,
                kind: category.row_type().to_string(),
            });
        }
    }
    rows
}

#[async_trait]
impl Command for SearchCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let query = args.text("query-text").unwrap_or_default();
        let show = Show::from_args(args);
        let limit = args.as_u64("limit").map(|l| l as usize);

        let aggregator = Aggregator::new(show.tracked()).with_limit(limit);
        let mut aggregation = aggregator
            .aggregate(|cursor| {
                let url = search_url(ctx.endpoints, query, cursor);
                async move {
                    let body = ctx.send(Request::get(url)).await?;
                    let page: SearchPage = serde_json::from_value(body)?;
                    Ok::<_, RawRejection>(page.into_page())
                }
            })
            .await?;

        if show == Show::Summary {
            return Ok(Some(summary(&aggregation)));
        }

        if args.output() == Some("json") {
            let summary = summary(&aggregation);
            let mut result = Map::new();
            result.insert("summary".to_string(), summary);
            for category in [
                SearchCategory::Messages,
                SearchCategory::Users,
                SearchCategory::Topics,
                SearchCategory::Groups,
            ] {
                result.insert(
                    category.as_str().to_string(),
                    Value::Array(aggregation.take(&category)),
                );
            }
            return Ok(Some(Value::Object(result)));
        }

        Ok(Some(serde_json::to_value(rows(&mut aggregation))?))
    }
}
