// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Per-run context shared by every step

use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{PathsConfig, Settings};
use crate::trigger::Trigger;

/// Everything a step needs to know about the run it belongs to
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub workflow: String,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub working_dir: PathBuf,
    pub settings: Arc<Settings>,
    /// Settings paths resolved against the working directory
    pub paths: PathsConfig,
}

impl RunContext {
    pub fn new(
        workflow: &str,
        trigger: Trigger,
        started_at: DateTime<Utc>,
        working_dir: &Path,
        settings: Arc<Settings>,
    ) -> Self {
        let run_id = format!("{}-{}", started_at.format("%Y%m%dT%H%M%SZ"), workflow);
        let paths = settings.paths.resolve(working_dir);

        Self {
            run_id,
            workflow: workflow.to_string(),
            trigger,
            started_at,
            working_dir: working_dir.to_path_buf(),
            settings,
            paths,
        }
    }

    /// The run date used in file names and commit messages
    pub fn run_date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }

    /// Expand `{date}`, `{workflow}` and `{run_id}` in a template
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{date}", &self.run_date().format("%Y-%m-%d").to_string())
            .replace("{workflow}", &self.workflow)
            .replace("{run_id}", &self.run_id)
    }

    /// Resolve a path relative to the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}
