// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! # scrapeflow - Scheduled Scrape Workflows
//!
//! `scrapeflow` runs scheduled data-scrape workflows and commits their
//! results back to git only when something actually changed.
//!
//! ## Features
//!
//! - **Cron triggers** - Five-field schedules evaluated in UTC
//! - **Linear workflows** - Setup, scrape, publish, artifact steps
//! - **Commit if changed** - No empty commits when the data is unchanged
//! - **Native tasks** - FanGraphs, MLB and ESPN scrapes plus their analyses
//!
//! ## Quick Start
//!
//! ```bash
//! # Write scrapeflow.toml and the default workflows
//! scrapeflow init
//!
//! # Run a workflow now
//! scrapeflow run ac-scrape
//!
//! # Stay in the foreground and run workflows when they are due
//! scrapeflow daemon
//! ```

pub mod analysis;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod data;
pub mod errors;
pub mod git;
pub mod sources;
pub mod state;
pub mod steps;
pub mod trigger;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use errors::{ScrapeflowError, ScrapeflowResult};
pub use workflow::{Workflow, WorkflowExecutor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
