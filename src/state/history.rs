// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Run history
//!
//! Stores one JSON record per executed run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ScrapeflowError;
use crate::git::PublishOutcome;
use crate::trigger::Trigger;
use crate::workflow::{RunReport, StepStatus};

/// Persisted summary of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub workflow: String,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub steps: Vec<StepRecord>,
    /// Fingerprint of the data directory after the run
    #[serde(default)]
    pub data_fingerprint: Option<String>,
}

/// Persisted summary of a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub action: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub publish: Option<PublishOutcome>,
}

impl RunRecord {
    /// The publish outcome, if the run had a publish step that ran
    pub fn publish_outcome(&self) -> Option<&PublishOutcome> {
        self.steps.iter().find_map(|s| s.publish.as_ref())
    }
}

impl From<&RunReport> for RunRecord {
    fn from(report: &RunReport) -> Self {
        Self {
            run_id: report.run_id.clone(),
            workflow: report.workflow.clone(),
            trigger: report.trigger.clone(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            success: report.success,
            steps: report
                .steps
                .iter()
                .map(|s| StepRecord {
                    name: s.name.clone(),
                    action: s.action.clone(),
                    status: s.status,
                    duration_ms: s
                        .outcome
                        .as_ref()
                        .map(|o| o.duration.as_millis() as u64)
                        .unwrap_or(0),
                    exit_code: s.outcome.as_ref().map(|o| o.exit_code),
                    publish: s.outcome.as_ref().and_then(|o| o.publish.clone()),
                })
                .collect(),
            data_fingerprint: None,
        }
    }
}

/// Filesystem store of run records
pub struct RunHistory {
    dir: PathBuf,
}

impl RunHistory {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", run_id))
    }

    /// Persist a record
    pub fn store(&self, record: &RunRecord) -> Result<PathBuf, ScrapeflowError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ScrapeflowError::History {
            message: format!("Failed to create history directory: {}", e),
        })?;

        let path = self.record_path(&record.run_id);
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json).map_err(|e| ScrapeflowError::FileWriteError {
            path: path.clone(),
            error: e.to_string(),
        })?;

        Ok(path)
    }

    /// All records, newest first; unreadable files are skipped
    pub fn list(&self) -> Result<Vec<RunRecord>, ScrapeflowError> {
        let mut records = Vec::new();

        if !self.dir.exists() {
            return Ok(records);
        }

        for entry in std::fs::read_dir(&self.dir).map_err(|e| ScrapeflowError::History {
            message: format!("Failed to read history directory: {}", e),
        })? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }

    /// Most recent record for a workflow
    pub fn latest(&self, workflow: &str) -> Result<Option<RunRecord>, ScrapeflowError> {
        Ok(self.list()?.into_iter().find(|r| r.workflow == workflow))
    }

    /// Remove every record; returns how many were removed
    pub fn clear(&self) -> Result<usize, ScrapeflowError> {
        let count = self.list()?.len();
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).map_err(|e| ScrapeflowError::History {
                message: format!("Failed to clear history: {}", e),
            })?;
        }
        Ok(count)
    }
}

fn read_record(path: &Path) -> Result<RunRecord, ScrapeflowError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(Into::into)
}
