//! CLI domain: parse, route, help, output, and presentation only.
//! No pipeline logic; the route table hands every command to the executor.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{
    AadCommands, Cli, Commands, FlowCommands, SpoCommands, TeamsCommands, YammerCommands,
};
pub use presentation::{render, OutputFormat};
pub use route::{parsed_args, RunContext};
