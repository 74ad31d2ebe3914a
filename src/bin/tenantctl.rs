//! tenantctl CLI Binary
//!
//! Command-line interface for the tenant command pipeline.

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::process;
use tenantctl::cli::{Cli, RunContext};
use tenantctl::config::ConfigLoader;
use tenantctl::logging::{init_logging, LoggingConfig};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        report(&format!("Failed to initialize logging: {}", e));
        process::exit(1);
    }

    info!("tenantctl starting");

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            report(&format!("{:#}", e));
            process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let context = RunContext::new(cli.config.as_deref())?;
        context.execute(&cli).await
    });

    match result {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!(kind = ?e.kind(), "Command failed: {}", e);
            report(&tenantctl::cli::map_error(&e));
            process::exit(1);
        }
    }
}

fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Print a failure to stderr, red when stderr is a terminal.
fn report(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}", message.red());
    } else {
        eprintln!("{}", message);
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: explicit --log-* flags, then --quiet/--debug/--verbose, then
/// the config file, then defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "info".to_string();
    }
    if cli.debug {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
