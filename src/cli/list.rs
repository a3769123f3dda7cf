// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! List command - show workflows and their triggers

use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::Project;
use crate::state::RunHistory;
use crate::trigger::CronSchedule;
use crate::utils::print_header;

/// Run the list command
pub async fn run(config: Option<&Path>, verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let workflows = project.workflows()?;
    let history = RunHistory::new(project.paths.runs_dir());

    print_header("Workflows");

    if workflows.is_empty() {
        println!("{}", "  No workflows defined.".dimmed());
        return Ok(());
    }

    for (path, workflow) in &workflows.workflows {
        println!();
        println!("  {}", workflow.name.bold());
        if let Some(description) = &workflow.description {
            println!("    {}", description.dimmed());
        }

        for entry in &workflow.triggers.schedule {
            let described = CronSchedule::parse(&entry.cron)
                .map(|s| s.describe())
                .unwrap_or_else(|e| e.to_string().red().to_string());
            println!("    schedule: {} ({})", entry.cron.cyan(), described);
        }
        if workflow.triggers.manual {
            println!("    manual dispatch");
        }

        println!("    steps: {}", workflow.step_names().join(" → "));

        if let Some(last) = history.latest(&workflow.name)? {
            let status = if last.success { "ok".green() } else { "failed".red() };
            println!(
                "    last run: {} {}",
                last.started_at.format("%Y-%m-%d %H:%M UTC"),
                status
            );
        }

        if verbose {
            println!("    file: {}", path.display().to_string().dimmed());
        }
    }

    Ok(())
}
