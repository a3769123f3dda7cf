// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for scrapeflow.

pub mod artifacts;
pub mod daemon;
pub mod history;
pub mod init;
pub mod list;
pub mod run;
pub mod schedule;
pub mod scrape;
pub mod validate;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{PathsConfig, Settings};
use crate::errors::{RecoverySuggestion, ScrapeflowError};
use crate::workflow::WorkflowSet;

/// Scheduled scrape workflows
///
/// Run data-scrape workflows on a cron schedule and commit only what changed.
#[derive(Parser, Debug)]
#[clap(
    name = "scrapeflow",
    version,
    about = "Scheduled scrape workflows that commit their results only when data changed",
    long_about = None,
    after_help = "Examples:\n\
        scrapeflow init                     Write scrapeflow.toml and default workflows\n\
        scrapeflow run ac-scrape            Run a workflow now\n\
        scrapeflow schedule                 Show when workflows fire next\n\
        scrapeflow daemon                   Run workflows when they are due\n\n\
        See 'scrapeflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Settings file (default: ./scrapeflow.toml)
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write scrapeflow.toml and the default workflows
    Init {
        /// Overwrite existing files
        #[clap(short, long)]
        force: bool,
    },

    /// List workflows and their triggers
    List,

    /// Validate workflow definitions
    Validate {
        /// Only validate this workflow (default: all)
        workflow: Option<String>,
    },

    /// Run a workflow now (manual dispatch)
    Run {
        /// Workflow name
        workflow: String,

        /// Run only specific steps
        #[clap(short, long)]
        step: Vec<String>,

        /// Dry run (show what would be done)
        #[clap(long)]
        dry_run: bool,
    },

    /// Show upcoming fire times
    Schedule {
        /// Fire times to show per workflow
        #[clap(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// Stay in the foreground and run workflows when they are due
    Daemon,

    /// Run one built-in task outside any workflow
    Scrape {
        #[clap(subcommand)]
        task: ScrapeTask,
    },

    /// Artifact store management
    Artifacts {
        #[clap(subcommand)]
        action: ArtifactsAction,
    },

    /// Run history
    History {
        #[clap(subcommand)]
        action: HistoryAction,
    },
}

/// Built-in tasks runnable from the command line
#[derive(Subcommand, Debug, Clone)]
pub enum ScrapeTask {
    /// FanGraphs auction values for batters and pitchers
    Auction {
        /// Directory for the snapshots (default: data directory)
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Team batting splits vs LHP and RHP
    TeamSplits {
        #[clap(short, long)]
        season: Option<i32>,
    },

    /// Qualified pitcher leaderboard
    PitcherLeaders {
        #[clap(short, long)]
        season: Option<i32>,
    },

    /// Streaming-pitcher report for the coming days
    SmartStream {
        /// Report file
        #[clap(short, long, default_value = "smartstream_results.txt")]
        output: PathBuf,

        /// Days of schedule to scan
        #[clap(short, long, default_value = "7")]
        days: u32,
    },

    /// First-to-latest projection change analysis
    ProjectionChanges {
        /// Directory for the CSV reports
        #[clap(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

/// Artifact store actions
#[derive(Subcommand, Debug, Clone)]
pub enum ArtifactsAction {
    /// List stored artifacts
    List,

    /// Remove expired artifacts
    Prune,
}

/// Run history actions
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// Show recent runs
    List {
        /// Only runs of this workflow
        #[clap(short, long)]
        workflow: Option<String>,

        /// Maximum number of runs to show
        #[clap(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Delete every run record
    Clear {
        /// Skip confirmation
        #[clap(short, long)]
        yes: bool,
    },
}

/// Settings and directory layout for the current working directory
pub struct Project {
    pub root: PathBuf,
    pub settings: Arc<Settings>,
    pub paths: PathsConfig,
}

impl Project {
    /// Load settings for the current working directory
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let root = std::env::current_dir()
            .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;
        let settings = Settings::load(config, &root).map_err(report)?;
        let paths = settings.paths.resolve(&root);

        Ok(Self {
            root,
            settings: Arc::new(settings),
            paths,
        })
    }

    /// Every workflow in the workflows directory
    pub fn workflows(&self) -> Result<WorkflowSet> {
        WorkflowSet::load_dir(&self.paths.workflows_dir).map_err(report)
    }
}

/// Print the recovery suggestion for an error, then hand it to miette
pub fn report(error: ScrapeflowError) -> miette::Report {
    if let Some(suggestion) = RecoverySuggestion::for_error(&error) {
        eprintln!("{}", suggestion.to_string().dimmed());
    }
    error.into()
}
