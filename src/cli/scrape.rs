// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Scrape command - run one built-in task outside any workflow

use miette::Result;
use std::collections::HashMap;
use std::path::Path;

use super::run::{execute_workflow, print_failure};
use super::{Project, ScrapeTask};
use crate::sources::AuctionSettings;
use crate::trigger::Trigger;
use crate::workflow::{
    Action, ChangesTask, ExecutionOptions, NativeTask, SeasonTask, Step, StreamTask, Triggers,
    Workflow,
};

impl From<ScrapeTask> for NativeTask {
    fn from(task: ScrapeTask) -> Self {
        match task {
            ScrapeTask::Auction { output_dir } => Self::AuctionScrape(AuctionSettings {
                output_dir,
                ..AuctionSettings::default()
            }),
            ScrapeTask::TeamSplits { season } => Self::TeamSplits(SeasonTask { season }),
            ScrapeTask::PitcherLeaders { season } => Self::PitcherLeaders(SeasonTask { season }),
            ScrapeTask::SmartStream { output, days } => Self::SmartStream(StreamTask {
                output,
                days,
                ..StreamTask::default()
            }),
            ScrapeTask::ProjectionChanges { output_dir } => {
                Self::ProjectionChanges(ChangesTask {
                    output_dir,
                    ..ChangesTask::default()
                })
            }
        }
    }
}

/// A one-step workflow wrapping `task`
pub fn single_task_workflow(task: NativeTask) -> Workflow {
    Workflow {
        version: "1".to_string(),
        name: format!("scrape-{}", task.kind()),
        description: None,
        triggers: Triggers::default(),
        steps: vec![Step {
            name: task.kind().to_string(),
            description: None,
            action: Action::Task { task },
            env: HashMap::new(),
            allow_failure: false,
            condition: None,
        }],
        env: HashMap::new(),
    }
}

/// Run the scrape command
pub async fn run(task: ScrapeTask, config: Option<&Path>, verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let workflow = single_task_workflow(task.into());

    let options = ExecutionOptions {
        verbose,
        ..ExecutionOptions::default()
    };

    let report = execute_workflow(&project, &workflow, Trigger::Manual, &options).await?;
    if !report.success {
        print_failure(&report);
        return Err(miette::miette!("Task '{}' failed", workflow.steps[0].name));
    }

    Ok(())
}
