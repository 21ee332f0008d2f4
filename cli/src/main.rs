// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # poolguard
//!
//! The `poolguard` binary serves the PlatformAdmin validating webhook and
//! offers offline tooling around it.
//!
//! ## Commands
//!
//! - `poolguard serve` - Run the admission webhook HTTP server
//! - `poolguard check --object FILE` - Evaluate a manifest against the configured catalogs
//! - `poolguard config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use poolguard::commands::{self, CheckArgs, ConfigCommand, ServeArgs};
use poolguard_core::domain::webhook_config::WebhookConfigManifest;

/// poolguard - exclusive NodePool claims for PlatformAdmin
#[derive(Parser)]
#[command(name = "poolguard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "POOLGUARD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the config file value
    #[arg(long, global = true, env = "POOLGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json); defaults to the config file value
    #[arg(long, global = true, env = "POOLGUARD_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admission webhook server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Evaluate a PlatformAdmin manifest without a running server
    #[command(name = "check")]
    Check(CheckArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is set up before the command loads its config for real; a
    // broken file is reported by the command itself.
    let logging = WebhookConfigManifest::load_or_default(cli.config.clone())
        .map(|c| c.spec.observability.logging)
        .unwrap_or_default();
    init_logging(
        cli.log_level.as_deref().unwrap_or(&logging.level),
        cli.log_format.as_deref().unwrap_or(&logging.format),
    )?;

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::execute(args, cli.config).await,
        Some(Commands::Check(args)) => {
            let admitted = commands::check::execute(args, cli.config).await?;
            if !admitted {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().init(),
        _ => builder.compact().init(),
    }

    Ok(())
}
