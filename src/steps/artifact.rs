// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Artifact runner: keep a copy of run outputs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;

use super::{StepOutcome, StepRunner};
use crate::artifacts::{ArtifactStore, UploadRequest};
use crate::errors::ScrapeflowError;
use crate::workflow::{Action, RunContext, Step};

/// Artifact runner
pub struct ArtifactRunner;

impl ArtifactRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArtifactRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepRunner for ArtifactRunner {
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        _env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let Action::Artifact { name, path, retention_days } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Expected artifact action".to_string(),
            });
        };

        let start = Instant::now();
        let source = ctx.resolve(path);
        if !source.exists() {
            return Ok(StepOutcome::failure(
                format!("Artifact path not found: {}", source.display()),
                1,
                start.elapsed(),
            ));
        }

        let store = ArtifactStore::new(ctx.paths.artifacts_dir());
        let now = Utc::now();
        let manifest = store.upload(&UploadRequest {
            name,
            source: &source,
            retention_days: *retention_days,
            workflow: &ctx.workflow,
            run_id: &ctx.run_id,
            now,
        })?;

        let pruned = store.prune_expired(&now)?;
        if !pruned.is_empty() {
            tracing::info!("Pruned {} expired artifact(s)", pruned.len());
        }

        let stdout = format!(
            "Uploaded '{}': {} files, {} bytes, expires {}",
            manifest.name,
            manifest.files.len(),
            manifest.total_size(),
            manifest.expires_at.format("%Y-%m-%d")
        );
        let dir = store.root().join(&manifest.name).join(&manifest.run_id);

        Ok(StepOutcome::success(stdout, start.elapsed(), vec![dir]))
    }

    async fn check_available(&self) -> Result<bool, ScrapeflowError> {
        Ok(true)
    }

    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError> {
        let Action::Artifact { name, path, retention_days } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Not an artifact step".to_string(),
            });
        };

        let reason = if name.trim().is_empty() {
            Some("Artifact name is empty")
        } else if path.as_os_str().is_empty() {
            Some("Artifact path is empty")
        } else if *retention_days == 0 {
            Some("retention_days must be at least 1")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}
