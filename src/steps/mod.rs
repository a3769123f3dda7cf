// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Step runners
//!
//! This module provides the runner trait and one implementation per
//! action type (setup, shell, task, publish, artifact).

mod artifact;
mod publish;
mod setup;
mod shell;
mod task;

pub use artifact::ArtifactRunner;
pub use publish::PublishRunner;
pub use setup::SetupRunner;
pub use shell::{run_shell, ShellRunner};
pub use task::TaskRunner;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ScrapeflowError;
use crate::git::PublishOutcome;
use crate::workflow::{RunContext, Step};

/// Result of running a step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Whether the step succeeded
    pub success: bool,

    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code
    pub exit_code: i32,

    /// Files the step wrote
    pub outputs: Vec<PathBuf>,

    /// Execution duration
    pub duration: Duration,

    /// Set by publish steps
    pub publish: Option<PublishOutcome>,
}

impl StepOutcome {
    /// Create a successful outcome
    pub fn success(stdout: String, duration: Duration, outputs: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            stdout,
            stderr: String::new(),
            exit_code: 0,
            outputs,
            duration,
            publish: None,
        }
    }

    /// Create a failed outcome
    pub fn failure(stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code,
            outputs: vec![],
            duration,
            publish: None,
        }
    }

    /// Attach a publish outcome
    pub fn with_publish(mut self, publish: PublishOutcome) -> Self {
        self.publish = Some(publish);
        self
    }
}

/// Trait for step runners
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Run a step
    ///
    /// # Arguments
    /// * `step` - The step configuration
    /// * `ctx` - The run this step belongs to
    /// * `env` - Merged environment (process, workflow, step)
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError>;

    /// Check whether the runner's external tools are available
    async fn check_available(&self) -> Result<bool, ScrapeflowError>;

    /// Validate step configuration
    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError>;
}

/// Create the standard runner set
pub fn create_default_runners() -> HashMap<String, Box<dyn StepRunner>> {
    let mut runners: HashMap<String, Box<dyn StepRunner>> = HashMap::new();

    runners.insert("setup".to_string(), Box::new(SetupRunner::new()));
    runners.insert("shell".to_string(), Box::new(ShellRunner::new()));
    runners.insert("task".to_string(), Box::new(TaskRunner::new()));
    runners.insert("publish".to_string(), Box::new(PublishRunner::new()));
    runners.insert("artifact".to_string(), Box::new(ArtifactRunner::new()));

    runners
}
