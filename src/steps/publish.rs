// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Publish runner: commit-if-changed

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

use super::{StepOutcome, StepRunner};
use crate::errors::ScrapeflowError;
use crate::git::{GitRepo, PublishOutcome};
use crate::workflow::{Action, RunContext, Step};

/// Publish runner
pub struct PublishRunner;

impl PublishRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PublishRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepRunner for PublishRunner {
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let Action::Publish { paths, message, push, remote } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Expected publish action".to_string(),
            });
        };

        let start = Instant::now();
        let runs_dir = ctx.paths.runs_dir();
        let artifacts_dir = ctx.paths.artifacts_dir();
        let repo = GitRepo::new(&ctx.working_dir, &ctx.settings.git)
            .with_env(env)
            .excluding([runs_dir.as_path(), artifacts_dir.as_path()]);
        let message = ctx.expand(message);

        match repo.publish(paths, &message, *push, remote).await {
            Ok(outcome) => {
                let stdout = match &outcome {
                    PublishOutcome::NoChanges => "No changes to commit".to_string(),
                    committed => format!("{}: {}", committed, message),
                };
                Ok(StepOutcome::success(stdout, start.elapsed(), vec![]).with_publish(outcome))
            }
            Err(e @ ScrapeflowError::Git { .. }) => {
                Ok(StepOutcome::failure(e.to_string(), 1, start.elapsed()))
            }
            Err(e) => Err(e),
        }
    }

    async fn check_available(&self) -> Result<bool, ScrapeflowError> {
        Ok(which::which("git").is_ok())
    }

    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError> {
        let Action::Publish { message, remote, .. } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Not a publish step".to_string(),
            });
        };

        if message.trim().is_empty() {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Commit message is empty".to_string(),
            });
        }

        if remote.trim().is_empty() {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Remote name is empty".to_string(),
            });
        }

        Ok(())
    }
}
