// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Daemon command - run workflows when their schedules fire

use chrono::{DateTime, Duration, Timelike, Utc};
use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::run::{execute_workflow, print_failure};
use super::Project;
use crate::trigger::Trigger;
use crate::workflow::{ExecutionOptions, WorkflowSet};

/// Longest backlog replayed after a slow run
const MAX_CATCH_UP_MINUTES: i64 = 24 * 60;

fn minute_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(t)
}

fn until_next_minute(now: DateTime<Utc>) -> std::time::Duration {
    let next = minute_floor(now) + Duration::minutes(1);
    (next - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(1))
}

/// Workflows with a schedule firing in `(after, until]`, first fire first
///
/// Each workflow appears once even if it fired several times.
pub fn due_between(
    workflows: &WorkflowSet,
    after: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Vec<(String, Trigger)> {
    let mut due: Vec<(String, Trigger)> = Vec::new();
    let mut minute = minute_floor(after) + Duration::minutes(1);
    let until = minute_floor(until);

    while minute <= until {
        for workflow in workflows.iter() {
            if due.iter().any(|(name, _)| *name == workflow.name) {
                continue;
            }
            match workflow.due_schedule(&minute) {
                Ok(Some(schedule)) => due.push((
                    workflow.name.clone(),
                    Trigger::Schedule {
                        cron: schedule.expr().to_string(),
                    },
                )),
                Ok(None) => {}
                Err(e) => tracing::warn!("Workflow '{}': {}", workflow.name, e),
            }
        }
        minute += Duration::minutes(1);
    }

    due
}

/// Run the daemon until Ctrl-C
pub async fn run(config: Option<&Path>, verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let initial = project.workflows()?;

    println!("{}", "Starting scheduler...".bold());
    for workflow in initial.iter() {
        for schedule in workflow.schedules()? {
            println!("  {} {} {}", "→".blue(), workflow.name.bold(), schedule.describe().dimmed());
        }
    }
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    let mut last_checked = minute_floor(Utc::now());

    loop {
        tokio::select! {
            _ = tokio::time::sleep(until_next_minute(Utc::now())) => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Scheduler stopped.".dimmed());
                return Ok(());
            }
        }

        let now = Utc::now();
        let after = last_checked.max(now - Duration::minutes(MAX_CATCH_UP_MINUTES));
        last_checked = minute_floor(now);

        // Reload so edits take effect without a restart
        let workflows = match project.workflows() {
            Ok(set) => set,
            Err(e) => {
                eprintln!("{}: {}", "Failed to load workflows".red(), e);
                continue;
            }
        };

        for (name, trigger) in due_between(&workflows, after, now) {
            let Ok(workflow) = workflows.get(&name) else {
                continue;
            };

            println!("{}", "─".repeat(50).dimmed());
            tracing::info!("{} fired by {}", name, trigger);

            let options = ExecutionOptions {
                verbose,
                ..ExecutionOptions::default()
            };

            match execute_workflow(&project, workflow, trigger, &options).await {
                Ok(report) if report.success => {}
                Ok(report) => print_failure(&report),
                Err(e) => eprintln!("{}: {:?}", "Run error".red(), e),
            }
        }
    }
}
