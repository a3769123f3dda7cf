// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Schedule command - show upcoming fire times

use chrono::Utc;
use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::Project;
use crate::utils::print_header;

/// Run the schedule command
pub async fn run(count: usize, config: Option<&Path>, _verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let workflows = project.workflows()?;
    let now = Utc::now();

    print_header("Upcoming runs (UTC)");

    let mut upcoming = Vec::new();
    for workflow in workflows.iter() {
        for schedule in workflow.schedules()? {
            for at in schedule.upcoming(&now, count) {
                upcoming.push((at, workflow.name.as_str(), schedule.expr().to_string()));
            }
        }
    }

    if upcoming.is_empty() {
        println!("{}", "  No scheduled workflows.".dimmed());
        return Ok(());
    }

    upcoming.sort();
    for (at, name, expr) in upcoming {
        println!(
            "  {}  {:<16} {}",
            at.format("%Y-%m-%d %H:%M"),
            name.bold(),
            expr.dimmed()
        );
    }

    Ok(())
}
