// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Workflow definitions and execution
//!
//! This module defines workflows, their steps and triggers, and the
//! executor that runs them.

mod context;
mod definition;
mod executor;
mod validation;

pub use context::RunContext;
pub use definition::*;
pub use executor::{ExecutionOptions, RunReport, StepReport, StepStatus, WorkflowExecutor};
pub use validation::{ValidationResult, WorkflowValidator};

use std::path::{Path, PathBuf};

use crate::errors::ScrapeflowError;

/// Every workflow in a directory
#[derive(Debug, Clone, Default)]
pub struct WorkflowSet {
    pub workflows: Vec<(PathBuf, Workflow)>,
}

impl WorkflowSet {
    /// Load `*.yaml` and `*.yml` files, sorted by workflow name
    pub fn load_dir(dir: &Path) -> Result<Self, ScrapeflowError> {
        if !dir.is_dir() {
            return Err(ScrapeflowError::WorkflowDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut workflows = Vec::new();
        for ext in ["yaml", "yml"] {
            let pattern = dir.join(format!("*.{}", ext));
            for path in glob::glob(&pattern.to_string_lossy())?.filter_map(Result::ok) {
                let workflow = Workflow::from_file(&path)?;
                tracing::debug!("Loaded workflow '{}' from {}", workflow.name, path.display());
                workflows.push((path, workflow));
            }
        }

        workflows.sort_by(|a, b| a.1.name.cmp(&b.1.name));

        for pair in workflows.windows(2) {
            if pair[0].1.name == pair[1].1.name {
                return Err(ScrapeflowError::InvalidWorkflow {
                    reason: format!(
                        "Workflow '{}' is defined in both {} and {}",
                        pair[0].1.name,
                        pair[0].0.display(),
                        pair[1].0.display()
                    ),
                    help: Some("Workflow names must be unique".into()),
                });
            }
        }

        Ok(Self { workflows })
    }

    /// Look up a workflow by name
    pub fn get(&self, name: &str) -> Result<&Workflow, ScrapeflowError> {
        self.workflows
            .iter()
            .map(|(_, w)| w)
            .find(|w| w.name == name)
            .ok_or_else(|| ScrapeflowError::WorkflowNotFound { name: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.iter().map(|(_, w)| w)
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }
}
