//! CLI parse: clap types for tenantctl. No behavior; definitions only.
//!
//! Command options are all optional at the clap level; required options and
//! option sets are enforced by the validation engine so every rejection
//! reads the same way.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tenantctl - manage Microsoft 365 tenant services from the command line
#[derive(Parser, Debug)]
#[command(name = "tenantctl")]
#[command(about = "Manage Microsoft 365 tenant services from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress information
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log debug information, including requests
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable logging entirely
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Output type (json, text)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (when log output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Microsoft Entra ID commands
    Aad {
        #[command(subcommand)]
        command: AadCommands,
    },
    /// Power Automate commands
    Flow {
        #[command(subcommand)]
        command: FlowCommands,
    },
    /// SharePoint Online commands
    Spo {
        #[command(subcommand)]
        command: SpoCommands,
    },
    /// Microsoft Teams commands
    Teams {
        #[command(subcommand)]
        command: TeamsCommands,
    },
    /// Yammer commands
    Yammer {
        #[command(subcommand)]
        command: YammerCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AadCommands {
    /// Microsoft 365 group commands
    O365group {
        #[command(subcommand)]
        command: O365GroupCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum O365GroupCommands {
    /// Create a Microsoft Teams team under an existing Microsoft 365 group
    Teamify(TeamifyArgs),
}

#[derive(Args, Debug)]
pub struct TeamifyArgs {
    /// The ID of the Microsoft 365 group
    #[arg(short = 'i', long)]
    pub group_id: Option<String>,

    /// The mail alias of the Microsoft 365 group
    #[arg(long)]
    pub mail_nickname: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum FlowCommands {
    /// Flow run commands
    Run {
        #[command(subcommand)]
        command: FlowRunCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum FlowRunCommands {
    /// Get information about a specific flow run
    Get(FlowRunGetArgs),
}

#[derive(Args, Debug)]
pub struct FlowRunGetArgs {
    /// The name of the run
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// The name of the flow
    #[arg(short = 'f', long)]
    pub flow: Option<String>,

    /// The name of the environment where the flow is located
    #[arg(short = 'e', long)]
    pub environment: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SpoCommands {
    /// List item commands
    Listitem {
        #[command(subcommand)]
        command: ListItemCommands,
    },
    /// Site commands
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },
    /// Taxonomy term store commands
    Term {
        #[command(subcommand)]
        command: TermCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListItemCommands {
    /// List item role inheritance commands
    Roleinheritance {
        #[command(subcommand)]
        command: RoleInheritanceCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleInheritanceCommands {
    /// Break role inheritance of a list item
    Break(RoleInheritanceBreakArgs),
}

#[derive(Args, Debug)]
pub struct RoleInheritanceBreakArgs {
    /// URL of the site where the item is located
    #[arg(short = 'u', long)]
    pub web_url: Option<String>,

    /// ID of the list item
    #[arg(long)]
    pub list_item_id: Option<String>,

    /// ID of the list
    #[arg(short = 'l', long)]
    pub list_id: Option<String>,

    /// Title of the list
    #[arg(short = 't', long)]
    pub list_title: Option<String>,

    /// Clear all existing permissions
    #[arg(short = 'c', long)]
    pub clear_existing_permissions: bool,
}

#[derive(Subcommand, Debug)]
pub enum SiteCommands {
    /// Site application permission commands
    Apppermission {
        #[command(subcommand)]
        command: AppPermissionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AppPermissionCommands {
    /// Remove an application permission from a site
    Remove(AppPermissionRemoveArgs),
}

#[derive(Args, Debug)]
pub struct AppPermissionRemoveArgs {
    /// URL of the site collection
    #[arg(short = 'u', long)]
    pub site_url: Option<String>,

    /// Client ID of the app
    #[arg(short = 'i', long)]
    pub app_id: Option<String>,

    /// Display name of the app
    #[arg(short = 'n', long)]
    pub app_display_name: Option<String>,

    /// ID of the permission to remove
    #[arg(long)]
    pub permission_id: Option<String>,

    /// Don't prompt for confirmation
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum TermCommands {
    /// Term set commands
    Set {
        #[command(subcommand)]
        command: TermSetCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TermSetCommands {
    /// Get a taxonomy term set
    Get(TermSetGetArgs),
}

#[derive(Args, Debug)]
pub struct TermSetGetArgs {
    /// ID of the term set
    #[arg(short = 'i', long)]
    pub id: Option<String>,

    /// Name of the term set
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// ID of the term group to which the term set belongs
    #[arg(long)]
    pub term_group_id: Option<String>,

    /// Name of the term group to which the term set belongs
    #[arg(long)]
    pub term_group_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TeamsCommands {
    /// Teams app catalog commands
    App {
        #[command(subcommand)]
        command: TeamsAppCommands,
    },
    /// Channel tab commands
    Tab {
        #[command(subcommand)]
        command: TeamsTabCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamsAppCommands {
    /// Publish a Teams app to the organization's app catalog
    Publish(AppPublishArgs),
}

#[derive(Args, Debug)]
pub struct AppPublishArgs {
    /// Path to the Teams app package (.zip)
    #[arg(short = 'p', long)]
    pub file_path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TeamsTabCommands {
    /// Get information about a channel tab
    Get(TabGetArgs),
}

#[derive(Args, Debug)]
pub struct TabGetArgs {
    #[arg(long)]
    pub team_id: Option<String>,

    #[arg(long)]
    pub team_name: Option<String>,

    #[arg(long)]
    pub channel_id: Option<String>,

    #[arg(long)]
    pub channel_name: Option<String>,

    #[arg(short = 'i', long)]
    pub tab_id: Option<String>,

    #[arg(short = 'n', long)]
    pub tab_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum YammerCommands {
    /// Search messages, topics, users and groups
    Search(YammerSearchArgs),
}

#[derive(Args, Debug)]
pub struct YammerSearchArgs {
    /// The query for the search
    #[arg(long)]
    pub query_text: Option<String>,

    /// summary, messages, users, topics or groups
    #[arg(long)]
    pub show: Option<String>,

    /// Maximum number of entries per category
    #[arg(long)]
    pub limit: Option<String>,
}
