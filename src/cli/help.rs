//! CLI help and command-name contract for routing and telemetry.

use crate::cli::parse::{
    AadCommands, AppPermissionCommands, Commands, FlowCommands, FlowRunCommands,
    ListItemCommands, O365GroupCommands, RoleInheritanceCommands, SiteCommands, SpoCommands,
    TeamsAppCommands, TeamsCommands, TeamsTabCommands, TermCommands, TermSetCommands,
    YammerCommands,
};

/// Registry name of the command (e.g. "yammer search", "spo site apppermission remove").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Aad { command } => aad_command_name(command),
        Commands::Flow { command } => flow_command_name(command),
        Commands::Spo { command } => spo_command_name(command),
        Commands::Teams { command } => teams_command_name(command),
        Commands::Yammer { command } => yammer_command_name(command),
    }
}

pub fn aad_command_name(command: &AadCommands) -> &'static str {
    match command {
        AadCommands::O365group {
            command: O365GroupCommands::Teamify(_),
        } => "aad o365group teamify",
    }
}

pub fn flow_command_name(command: &FlowCommands) -> &'static str {
    match command {
        FlowCommands::Run {
            command: FlowRunCommands::Get(_),
        } => "flow run get",
    }
}

pub fn spo_command_name(command: &SpoCommands) -> &'static str {
    match command {
        SpoCommands::Listitem {
            command:
                ListItemCommands::Roleinheritance {
                    command: RoleInheritanceCommands::Break(_),
                },
        } => "spo listitem roleinheritance break",
        SpoCommands::Site {
            command:
                SiteCommands::Apppermission {
                    command: AppPermissionCommands::Remove(_),
                },
        } => "spo site apppermission remove",
        SpoCommands::Term {
            command:
                TermCommands::Set {
                    command: TermSetCommands::Get(_),
                },
        } => "spo term set get",
    }
}

pub fn teams_command_name(command: &TeamsCommands) -> &'static str {
    match command {
        TeamsCommands::App {
            command: TeamsAppCommands::Publish(_),
        } => "teams app publish",
        TeamsCommands::Tab {
            command: TeamsTabCommands::Get(_),
        } => "teams tab get",
    }
}

pub fn yammer_command_name(command: &YammerCommands) -> &'static str {
    match command {
        YammerCommands::Search(_) => "yammer search",
    }
}
