//! CLI route: single route table and run context. Builds parsed arguments at
//! the boundary, runs the executor, and hands results to presentation.

use crate::args::ParsedArgs;
use crate::cli::command_name;
use crate::cli::parse::{
    AadCommands, AppPermissionCommands, Cli, Commands, FlowCommands, FlowRunCommands,
    ListItemCommands, O365GroupCommands, RoleInheritanceCommands, SiteCommands, SpoCommands,
    TeamsAppCommands, TeamsCommands, TeamsTabCommands, TermCommands, TermSetCommands,
    YammerCommands,
};
use crate::cli::presentation::{render, OutputFormat};
use crate::config::{AppConfig, ConfigLoader};
use crate::confirm::{Prompter, TerminalPrompter};
use crate::error::CommandError;
use crate::executor::{CommandExecutor, Outcome};
use crate::registry::CommandRegistry;
use crate::session::{Session, StaticTokenSource, TokenSource};
use crate::transport::{HttpTransport, Transport};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: registry, executor, and the configured
/// output format.
pub struct RunContext {
    registry: CommandRegistry,
    executor: CommandExecutor,
    default_output: String,
}

impl RunContext {
    /// Load configuration and wire the HTTP transport, terminal prompter and
    /// configured credentials.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CommandError> {
        let config = ConfigLoader::load(config_path)?;
        let session = Arc::new(Session::new(Box::new(StaticTokenSource::from_config(
            &config.auth,
        ))));
        let transport = Arc::new(HttpTransport::new(Arc::clone(&session), &config.http)?);
        Self::assemble(&config, session, transport, Arc::new(TerminalPrompter))
    }

    /// Wire a context from explicit collaborators.
    pub fn with_parts(
        config: &AppConfig,
        tokens: Box<dyn TokenSource>,
        transport: Arc<dyn Transport>,
        prompter: Arc<dyn Prompter>,
    ) -> Result<Self, CommandError> {
        Self::assemble(config, Arc::new(Session::new(tokens)), transport, prompter)
    }

    fn assemble(
        config: &AppConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        prompter: Arc<dyn Prompter>,
    ) -> Result<Self, CommandError> {
        let registry = CommandRegistry::with_builtin()
            .map_err(|e| CommandError::config(e.to_string()))?;
        let executor = CommandExecutor::new(session, transport, prompter, config.endpoints.clone());
        Ok(Self {
            registry,
            executor,
            default_output: config.output.format.clone(),
        })
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Execute the parsed command line. Returns the text to print; empty when
    /// the command produced nothing or was declined. Commands see the
    /// effective output format, including the configured default.
    pub async fn execute(&self, cli: &Cli) -> Result<String, CommandError> {
        let name = command_name(&cli.command);
        let output = cli.output.as_deref().unwrap_or(&self.default_output);
        let format: OutputFormat = output.parse()?;
        let command = self
            .registry
            .get(name)
            .ok_or_else(|| CommandError::config(format!("Command '{}' is not registered", name)))?;
        let args = parsed_args(cli).with("output", output);
        debug!(command = name, options = ?args.names().collect::<Vec<_>>(), "Routing command");

        match self.executor.run(command.as_ref(), &args).await? {
            Outcome::Declined => Ok(String::new()),
            Outcome::Completed(None) => Ok(String::new()),
            Outcome::Completed(Some(value)) => {
                info!(command = name, "Rendering result");
                render(&value, format, command.spec().default_properties())
            }
        }
    }
}

/// Build the argument bag for one invocation. Keys are long option names;
/// `output` is present only when given on the command line, and
/// `RunContext::execute` fills in the configured default.
pub fn parsed_args(cli: &Cli) -> ParsedArgs {
    let args = ParsedArgs::new()
        .with_switch("debug", cli.debug)
        .with_switch("verbose", cli.verbose)
        .with_opt("output", cli.output.clone());

    match &cli.command {
        Commands::Aad {
            command:
                AadCommands::O365group {
                    command: O365GroupCommands::Teamify(a),
                },
        } => args
            .with_opt("group-id", a.group_id.clone())
            .with_opt("mail-nickname", a.mail_nickname.clone()),
        Commands::Flow {
            command:
                FlowCommands::Run {
                    command: FlowRunCommands::Get(a),
                },
        } => args
            .with_opt("name", a.name.clone())
            .with_opt("flow", a.flow.clone())
            .with_opt("environment", a.environment.clone()),
        Commands::Spo {
            command:
                SpoCommands::Listitem {
                    command:
                        ListItemCommands::Roleinheritance {
                            command: RoleInheritanceCommands::Break(a),
                        },
                },
        } => args
            .with_opt("web-url", a.web_url.clone())
            .with_opt("list-item-id", a.list_item_id.clone())
            .with_opt("list-id", a.list_id.clone())
            .with_opt("list-title", a.list_title.clone())
            .with_switch("clear-existing-permissions", a.clear_existing_permissions),
        Commands::Spo {
            command:
                SpoCommands::Site {
                    command:
                        SiteCommands::Apppermission {
                            command: AppPermissionCommands::Remove(a),
                        },
                },
        } => args
            .with_opt("site-url", a.site_url.clone())
            .with_opt("app-id", a.app_id.clone())
            .with_opt("app-display-name", a.app_display_name.clone())
            .with_opt("permission-id", a.permission_id.clone())
            .with_switch("confirm", a.confirm),
        Commands::Spo {
            command:
                SpoCommands::Term {
                    command:
                        TermCommands::Set {
                            command: TermSetCommands::Get(a),
                        },
                },
        } => args
            .with_opt("id", a.id.clone())
            .with_opt("name", a.name.clone())
            .with_opt("term-group-id", a.term_group_id.clone())
            .with_opt("term-group-name", a.term_group_name.clone()),
        Commands::Teams {
            command:
                TeamsCommands::App {
                    command: TeamsAppCommands::Publish(a),
                },
        } => args.with_opt("file-path", a.file_path.clone()),
        Commands::Teams {
            command:
                TeamsCommands::Tab {
                    command: TeamsTabCommands::Get(a),
                },
        } => args
            .with_opt("team-id", a.team_id.clone())
            .with_opt("team-name", a.team_name.clone())
            .with_opt("channel-id", a.channel_id.clone())
            .with_opt("channel-name", a.channel_name.clone())
            .with_opt("tab-id", a.tab_id.clone())
            .with_opt("tab-name", a.tab_name.clone()),
        Commands::Yammer {
            command: YammerCommands::Search(a),
        } => args
            .with_opt("query-text", a.query_text.clone())
            .with_opt("show", a.show.clone())
            .with_opt("limit", a.limit.clone()),
    }
}
