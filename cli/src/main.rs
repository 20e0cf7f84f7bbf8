// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Caroline Alpha CLI
//!
//! The `caroline` binary runs the neural core daemon and talks to a running
//! one.
//!
//! ## Commands
//!
//! - `caroline serve` - Run the background services and the status API
//! - `caroline status` - System status from a running daemon
//! - `caroline decisions` - Recent autonomous decisions
//! - `caroline queues` - Feed queue fill levels
//! - `caroline force` - Queue a forced decision

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;

/// Caroline Alpha - autonomous background intelligence daemon
#[derive(Parser)]
#[command(name = "caroline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(
        short,
        long,
        global = true,
        env = "CAROLINE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, global = true, env = "CAROLINE_PORT", default_value = "8400")]
    port: u16,

    /// HTTP API host
    #[arg(long, global = true, env = "CAROLINE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CAROLINE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the neural core daemon (background services + status API)
    Serve,

    /// Show system status from a running daemon
    Status,

    /// Show recent autonomous decisions
    Decisions {
        /// How many decisions to fetch
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show feed queue fill levels
    Queues,

    /// Queue a forced decision, bypassing the rule table
    Force {
        /// Decision type (e.g. route_change)
        decision_type: String,

        /// Decision payload as inline JSON
        #[arg(long, default_value = "{}")]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve => commands::serve::run(cli.config.as_deref(), &cli.host, cli.port).await,
        Commands::Status => commands::query::status(&cli.host, cli.port).await,
        Commands::Decisions { limit } => commands::query::decisions(&cli.host, cli.port, limit).await,
        Commands::Queues => commands::query::queues(&cli.host, cli.port).await,
        Commands::Force {
            decision_type,
            data,
        } => {
            if decision_type.trim().is_empty() {
                eprintln!("{}", "Decision type must not be empty.".yellow());
                std::process::exit(1);
            }
            commands::query::force(&cli.host, cli.port, &decision_type, &data).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
