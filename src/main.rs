// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! scrapeflow - Scheduled Scrape Workflows
//!
//! Run scrape workflows on a schedule and commit only what changed.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrapeflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrapeflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let config = cli.config.as_deref();
    let verbose = cli.verbose;

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { force } => scrapeflow::cli::init::run(force, verbose).await,
        Commands::List => scrapeflow::cli::list::run(config, verbose).await,
        Commands::Validate { workflow } => {
            scrapeflow::cli::validate::run(workflow, config, verbose).await
        }
        Commands::Run {
            workflow,
            step,
            dry_run,
        } => scrapeflow::cli::run::run(workflow, step, dry_run, config, verbose).await,
        Commands::Schedule { count } => scrapeflow::cli::schedule::run(count, config, verbose).await,
        Commands::Daemon => scrapeflow::cli::daemon::run(config, verbose).await,
        Commands::Scrape { task } => scrapeflow::cli::scrape::run(task, config, verbose).await,
        Commands::Artifacts { action } => {
            scrapeflow::cli::artifacts::run(action, config, verbose).await
        }
        Commands::History { action } => scrapeflow::cli::history::run(action, config, verbose).await,
    }
}
