//! `spo listitem roleinheritance break`, `spo site apppermission remove`

use super::{collection, encode_query_parameter, escape_xml, id_of};
use crate::args::{OptionValue, ParsedArgs};
use crate::config::EndpointConfig;
use crate::error::{CommandError, SpecError};
use crate::executor::{Command, CommandContext};
use crate::normalize::RawRejection;
use crate::options::{CommandSpec, OptionSet};
use crate::transport::{Request, ACCEPT_JSON_NOMETADATA, ACCEPT_JSON_NO_METADATA};
use crate::validation::rules::{check_sharepoint_url, guid_message, is_valid_guid};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

pub struct RoleInheritanceBreakCommand {
    spec: CommandSpec,
}

impl RoleInheritanceBreakCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("spo listitem roleinheritance break", "Break inheritance of list item")
            .telemetry(|args, properties| {
                properties.insert("list-id".to_string(), Value::Bool(args.is_present("list-id")));
                properties.insert("list-title".to_string(), Value::Bool(args.is_present("list-title")));
                properties.insert(
                    "clear-existing-permissions".to_string(),
                    Value::Bool(args.switch("clear-existing-permissions")),
                );
            })
            .declare(&[
                ("-u, --web-url <webUrl>", "URL of the site where the item is located"),
                ("--list-item-id <listItemId>", "ID of the item for which to break role inheritance"),
                ("-l, --list-id [listId]", "ID of the list. Specify either list-id or list-title"),
                ("-t, --list-title [listTitle]", "Title of the list. Specify either list-id or list-title"),
                ("-c, --clear-existing-permissions", "Clear all existing permissions"),
            ])
            .validate_with(|args| {
                if let Some(web_url) = args.text("web-url") {
                    check_sharepoint_url(web_url)?;
                }
                if let Some(list_id) = args.text("list-id") {
                    if !is_valid_guid(list_id) {
                        return Err(guid_message(list_id));
                    }
                }
                match args.get("list-item-id") {
                    Some(OptionValue::Text(id)) if id.trim().parse::<f64>().is_err() => {
                        Err(format!("{} is not a number", id))
                    }
                    _ => Ok(()),
                }
            })
            .declare_sets([OptionSet::exactly_one(["list-id", "list-title"])])
            .build()?;
        Ok(Self { spec })
    }
}

fn list_url(web_url: &str, args: &ParsedArgs) -> String {
    let mut url = format!("{}/_api/web/lists", web_url.trim_end_matches('/'));
    match args.text("list-id") {
        Some(list_id) => url.push_str(&format!("(guid'{}')", encode_query_parameter(list_id))),
        None => url.push_str(&format!(
            "/getbytitle('{}')",
            encode_query_parameter(args.text("list-title").unwrap_or_default())
        )),
    }
    url
}

#[async_trait]
impl Command for RoleInheritanceBreakCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let web_url = args.text("web-url").unwrap_or_default();
        if args.verbose() {
            info!(web_url, "Breaking role inheritance of list item");
        }

        let item_id = args.get("list-item-id").map(ToString::to_string).unwrap_or_default();
        let keep_existing = !args.switch("clear-existing-permissions");
        let url = format!(
            "{}/items({})/breakroleinheritance({})",
            list_url(web_url, args),
            item_id,
            keep_existing
        );
        ctx.send(
            Request::post(url)
                .accept(ACCEPT_JSON_NOMETADATA)
                .header("content-type", "application/json"),
        )
        .await?;
        Ok(None)
    }
}

pub struct AppPermissionRemoveCommand {
    spec: CommandSpec,
}

impl AppPermissionRemoveCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("spo site apppermission remove", "Removes a specific application permission from a site")
            .track_presence(&["app-id", "app-display-name", "permission-id"])
            .declare(&[
                ("-u, --site-url <siteUrl>", "URL of the site collection"),
                ("-i, --app-id [appId]", "Client ID of the Azure AD app to remove permissions for"),
                ("-n, --app-display-name [appDisplayName]", "Display name of the Azure AD app to remove permissions for"),
                ("--permission-id [permissionId]", "ID of the permission to remove"),
            ])
            .validate_with(|args| {
                if let Some(site_url) = args.text("site-url") {
                    check_sharepoint_url(site_url)?;
                }
                match args.text("app-id") {
                    Some(app_id) if !is_valid_guid(app_id) => Err(guid_message(app_id)),
                    _ => Ok(()),
                }
            })
            .declare_sets([OptionSet::exactly_one(["app-id", "app-display-name", "permission-id"])])
            .destructive()
            .build()?;
        Ok(Self { spec })
    }

    /// Graph site id for a site URL, e.g.
    /// `contoso.sharepoint.com,<site guid>,<web guid>`.
    async fn site_id(ctx: &CommandContext<'_>, site_url: &str) -> Result<String, RawRejection> {
        let url = Url::parse(site_url)
            .map_err(|e| RawRejection::message(format!("{} is not a valid URL: {}", site_url, e)))?;
        let host = url.host_str().unwrap_or_default();
        let request = Request::get(EndpointConfig::join(
            &ctx.endpoints.graph,
            &format!("v1.0/sites/{}:{}", host, url.path().trim_end_matches('/')),
        ))
        .accept(ACCEPT_JSON_NO_METADATA);
        let site = ctx.send(request).await?;
        id_of(&site).ok_or_else(|| RawRejection::message(format!("Site {} not found", site_url)))
    }

    async fn permission_ids(
        ctx: &CommandContext<'_>,
        site_id: &str,
        args: &ParsedArgs,
    ) -> Result<Vec<String>, RawRejection> {
        if let Some(permission_id) = args.text("permission-id") {
            return Ok(vec![permission_id.to_string()]);
        }

        let request = Request::get(EndpointConfig::join(
            &ctx.endpoints.graph,
            &format!("v1.0/sites/{}/permissions", site_id),
        ))
        .accept(ACCEPT_JSON_NO_METADATA);
        let body = ctx.send(request).await?;

        let (field, wanted) = match (args.text("app-id"), args.text("app-display-name")) {
            (Some(app_id), _) => ("id", app_id),
            (None, Some(name)) => ("displayName", name),
            (None, None) => return Ok(Vec::new()),
        };
        Ok(collection(&body)
            .iter()
            .filter(|permission| grants_application(permission, field, wanted))
            .filter_map(id_of)
            .collect())
    }
}

/// Whether any identity the permission is granted to is the given app.
fn grants_application(permission: &Value, field: &str, wanted: &str) -> bool {
    permission
        .get("grantedToIdentities")
        .and_then(Value::as_array)
        .is_some_and(|identities| {
            identities.iter().any(|identity| {
                identity
                    .pointer(&format!("/application/{}", field))
                    .and_then(Value::as_str)
                    == Some(wanted)
            })
        })
}

#[async_trait]
impl Command for AppPermissionRemoveCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn confirmation_prompt(&self, args: &ParsedArgs) -> String {
        format!(
            "Are you sure you want to remove the specified application permission from site {}?",
            args.text("site-url").unwrap_or_default()
        )
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let site_url = args.text("site-url").unwrap_or_default();
        let site_id = Self::site_id(ctx, site_url).await?;
        let permission_ids = Self::permission_ids(ctx, &site_id, args).await?;
        debug!(site_id = %site_id, count = permission_ids.len(), "Removing site permissions");

        for permission_id in permission_ids {
            let url = EndpointConfig::join(
                &ctx.endpoints.graph,
                &format!("v1.0/sites/{}/permissions/{}", site_id, permission_id),
            );
            ctx.send(Request::delete(url).accept(ACCEPT_JSON_NO_METADATA)).await?;
        }
        Ok(None)
    }
}

const CLIENT_SVC_APPLICATION: &str = "tenantctl";

pub struct TermSetGetCommand {
    spec: CommandSpec,
}

impl TermSetGetCommand {
    pub fn new() -> Result<Self, SpecError> {
        let spec = CommandSpec::builder("spo term set get", "Gets information about the specified taxonomy term set")
            .track_presence(&["id", "name", "term-group-id", "term-group-name"])
            .declare(&[
                ("-i, --id [id]", "ID of the term set to retrieve. Specify either name or id"),
                ("-n, --name [name]", "Name of the term set to retrieve. Specify either name or id"),
                ("--term-group-id [termGroupId]", "ID of the term group to which the term set belongs. Specify either term-group-id or term-group-name"),
                ("--term-group-name [termGroupName]", "Name of the term group to which the term set belongs. Specify either term-group-id or term-group-name"),
            ])
            .validate_with(|args| {
                for name in ["id", "term-group-id"] {
                    match args.text(name) {
                        Some(value) if !is_valid_guid(value) => return Err(guid_message(value)),
                        _ => {}
                    }
                }
                Ok(())
            })
            .declare_sets([
                OptionSet::exactly_one(["id", "name"]),
                OptionSet::exactly_one(["term-group-id", "term-group-name"]),
            ])
            .build()?;
        Ok(Self { spec })
    }
}

/// `GetById` when a GUID was given, `GetByName` otherwise.
fn lookup_method(id: u32, parent_id: u32, guid: Option<&str>, name: Option<&str>) -> String {
    match guid {
        Some(guid) => format!(
            r#"<Method Id="{}" ParentId="{}" Name="GetById"><Parameters><Parameter Type="Guid">{{{}}}</Parameter></Parameters></Method>"#,
            id, parent_id, guid
        ),
        None => format!(
            r#"<Method Id="{}" ParentId="{}" Name="GetByName"><Parameters><Parameter Type="String">{}</Parameter></Parameters></Method>"#,
            id,
            parent_id,
            escape_xml(name.unwrap_or_default())
        ),
    }
}

/// ClientSvc query resolving term store, term group and term set.
fn term_set_query(args: &ParsedArgs) -> String {
    let term_group = lookup_method(62, 60, args.text("term-group-id"), args.text("term-group-name"));
    let term_set = lookup_method(67, 65, args.text("id"), args.text("name"));
    format!(
        concat!(
            r#"<Request AddExpandoFieldTypeSuffix="true" SchemaVersion="15.0.0.0" LibraryVersion="16.0.0.0" ApplicationName="{}" xmlns="http://schemas.microsoft.com/sharepoint/clientquery/2009">"#,
            r#"<Actions><ObjectPath Id="55" ObjectPathId="54" /><ObjectIdentityQuery Id="56" ObjectPathId="54" /><ObjectPath Id="58" ObjectPathId="57" /><ObjectIdentityQuery Id="59" ObjectPathId="57" /><ObjectPath Id="61" ObjectPathId="60" /><ObjectPath Id="63" ObjectPathId="62" /><ObjectIdentityQuery Id="64" ObjectPathId="62" /><ObjectPath Id="66" ObjectPathId="65" /><ObjectPath Id="68" ObjectPathId="67" /><ObjectIdentityQuery Id="69" ObjectPathId="67" />"#,
            r#"<Query Id="70" ObjectPathId="67"><Query SelectAllProperties="true"><Properties><Property Name="Name" ScalarProperty="true" /><Property Name="Id" ScalarProperty="true" /></Properties></Query></Query></Actions>"#,
            r#"<ObjectPaths><StaticMethod Id="54" Name="GetTaxonomySession" TypeId="{{981cbc68-9edc-4f8d-872f-71146fcbb84f}}" /><Method Id="57" ParentId="54" Name="GetDefaultSiteCollectionTermStore" /><Property Id="60" ParentId="57" Name="Groups" />{}<Property Id="65" ParentId="62" Name="TermSets" />{}</ObjectPaths></Request>"#
        ),
        CLIENT_SVC_APPLICATION, term_group, term_set
    )
}

/// `/Date(1536839573337)/` as an ISO 8601 UTC timestamp.
fn client_svc_date(raw: &str) -> Option<String> {
    let millis: i64 = raw.strip_prefix("/Date(")?.strip_suffix(")/")?.parse().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn client_svc_guid(raw: &str) -> Option<String> {
    raw.strip_prefix("/Guid(")?
        .strip_suffix(")/")
        .map(str::to_string)
}

/// The term set is the last object of a ClientSvc response. An `ErrorInfo`
/// on the first object rejects with its message as a plain string.
fn term_set_from(response: Value) -> Result<Value, RawRejection> {
    let Value::Array(mut objects) = response else {
        return Err(RawRejection::message("Unexpected ProcessQuery response"));
    };
    if let Some(error) = objects
        .first()
        .and_then(|head| head.get("ErrorInfo"))
        .filter(|error| !error.is_null())
    {
        let message = error
            .get("ErrorMessage")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(RawRejection::Payload(Value::String(message.to_string())));
    }

    let mut term_set = objects
        .pop()
        .ok_or_else(|| RawRejection::message("Unexpected ProcessQuery response"))?;
    if let Some(fields) = term_set.as_object_mut() {
        fields.remove("_ObjectIdentity_");
        fields.remove("_ObjectType_");
        for (key, clean) in [
            ("CreatedDate", client_svc_date as fn(&str) -> Option<String>),
            ("LastModifiedDate", client_svc_date),
            ("Id", client_svc_guid),
        ] {
            if let Some(value) = fields.get(key).and_then(Value::as_str).and_then(clean) {
                fields.insert(key.to_string(), Value::String(value));
            }
        }
    }
    Ok(term_set)
}

async fn request_digest(ctx: &CommandContext<'_>, site_url: &str) -> Result<String, RawRejection> {
    let body = ctx
        .send(Request::post(format!("{}/_api/contextinfo", site_url)).accept(ACCEPT_JSON_NOMETADATA))
        .await?;
    body.get("FormDigestValue")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RawRejection::message(format!("No request digest returned by {}", site_url)))
}

#[async_trait]
impl Command for TermSetGetCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn action(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, RawRejection> {
        let admin_url = ctx
            .endpoints
            .sharepoint_admin
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| {
                RawRejection::Failed(CommandError::config(
                    "SharePoint admin URL not configured: set endpoints.sharepoint_admin",
                ))
            })?;
        let digest = request_digest(ctx, admin_url).await?;
        if args.verbose() {
            info!("Retrieving taxonomy term set...");
        }

        let request = Request::post(format!("{}/_vti_bin/client.svc/ProcessQuery", admin_url))
            .header("X-RequestDigest", &digest)
            .text(term_set_query(args));
        let response = ctx.send(request).await?;
        Ok(Some(term_set_from(response)?))
    }
}
