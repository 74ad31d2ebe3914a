//! tenantctl: Command Execution Pipeline for Cloud Service CLIs
//!
//! Turns a parsed command invocation into a validated, optionally confirmed,
//! optionally paginated sequence of REST calls, and folds every service error
//! shape into a single `CommandError`.

pub mod args;
pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod executor;
pub mod logging;
pub mod normalize;
pub mod options;
pub mod paging;
pub mod registry;
pub mod session;
pub mod transport;
pub mod validation;
