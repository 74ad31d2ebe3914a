//! Value rules shared by command validators.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;
use uuid::Uuid;

pub fn is_valid_guid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Teams channel ids look like `19:<token>@thread.skype` or `@thread.tacv2`.
pub fn is_valid_teams_channel_id(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^19:[0-9a-z_-]+@thread\.(skype|tacv2)$").expect("valid channel id pattern")
        })
        .is_match(value)
}

/// Absolute `https` URL; returns the rejection message otherwise.
pub fn check_sharepoint_url(value: &str) -> Result<(), String> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "https" && url.host_str().is_some() => Ok(()),
        _ => Err(format!("{} is not a valid SharePoint Online site URL", value)),
    }
}

pub fn guid_message(value: &str) -> String {
    format!("{} is not a valid GUID", value)
}
