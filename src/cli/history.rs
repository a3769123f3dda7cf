// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! History command - show and clear run records

use colored::Colorize;
use miette::Result;
use std::io::{self, Write};
use std::path::Path;

use super::{HistoryAction, Project};
use crate::state::RunHistory;
use crate::utils::print_header;
use crate::workflow::StepStatus;

/// Run the history command
pub async fn run(action: HistoryAction, config: Option<&Path>, verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let history = RunHistory::new(project.paths.runs_dir());

    match action {
        HistoryAction::List { workflow, limit } => {
            let records: Vec<_> = history
                .list()?
                .into_iter()
                .filter(|r| workflow.as_deref().map_or(true, |w| r.workflow == w))
                .take(limit)
                .collect();

            print_header("Run history");

            if records.is_empty() {
                println!("{}", "  No runs recorded.".dimmed());
                return Ok(());
            }

            for record in &records {
                let status = if record.success { "✓".green() } else { "✗".red() };
                let publish = record
                    .publish_outcome()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "not published".to_string());
                let elapsed = (record.finished_at - record.started_at).num_seconds();

                println!(
                    "  {} {}  {:<14} {:>4}s  {}  {}",
                    status,
                    record.started_at.format("%Y-%m-%d %H:%M"),
                    record.workflow.bold(),
                    elapsed,
                    record.trigger.to_string().dimmed(),
                    publish
                );

                if verbose {
                    for step in &record.steps {
                        let glyph = match step.status {
                            StepStatus::Succeeded => "✓".green(),
                            StepStatus::Failed => "✗".red(),
                            StepStatus::AllowedFailure => "⚠".yellow(),
                            StepStatus::Skipped => "○".dimmed(),
                        };
                        println!("      {} {} ({}ms)", glyph, step.name, step.duration_ms);
                    }
                    if let Some(fingerprint) = &record.data_fingerprint {
                        println!("      data: {}", fingerprint[..fingerprint.len().min(16)].dimmed());
                    }
                }
            }

            Ok(())
        }

        HistoryAction::Clear { yes } => {
            let count = history.list()?.len();

            if count == 0 {
                println!("{}", "History is already empty.".dimmed());
                return Ok(());
            }

            if !yes {
                print!("Delete {} run record(s)? [y/N] ", count);
                io::stdout().flush().ok();

                let mut input = String::new();
                io::stdin().read_line(&mut input).ok();

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("{}", "Cancelled.".dimmed());
                    return Ok(());
                }
            }

            let removed = history.clear()?;
            println!("{}", format!("Removed {} run record(s).", removed).green());

            Ok(())
        }
    }
}
