// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Environment provisioner
//!
//! Verifies required tools and runs install commands before any task step.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;

use super::{run_shell, StepOutcome, StepRunner};
use crate::errors::{RecoverySuggestion, ScrapeflowError};
use crate::workflow::{Action, RunContext, Step};

/// Setup runner
pub struct SetupRunner;

impl SetupRunner {
    pub fn new() -> Self {
        Self
    }

    /// Tools from `tools` that cannot be resolved on the step's PATH
    pub fn missing_tools(tools: &[String], env: &HashMap<String, String>, cwd: &Path) -> Vec<String> {
        let path = env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));

        tools
            .iter()
            .filter(|tool| which::which_in(tool.as_str(), path.as_ref(), cwd).is_err())
            .cloned()
            .collect()
    }
}

impl Default for SetupRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepRunner for SetupRunner {
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let Action::Setup { tools, install, shell } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Expected setup action".to_string(),
            });
        };

        let start = Instant::now();

        let missing = Self::missing_tools(tools, env, &ctx.working_dir);
        if !missing.is_empty() {
            tracing::warn!("Missing tools: {}", missing.join(", "));
            let mut stderr = format!("Required tools not found on PATH: {}\n", missing.join(", "));
            for tool in &missing {
                stderr.push_str(&RecoverySuggestion::install_tool(tool).to_string());
            }
            return Ok(StepOutcome::failure(
                stderr,
                127,
                start.elapsed(),
            ));
        }

        let mut stdout = String::new();
        for command in install {
            tracing::info!("Installing: {}", command);
            let output = run_shell(shell, command, &ctx.working_dir, env).await?;
            stdout.push_str(&String::from_utf8_lossy(&output.stdout));

            if !output.status.success() {
                let mut outcome = StepOutcome::failure(
                    format!(
                        "Install command '{}' failed:\n{}",
                        command,
                        String::from_utf8_lossy(&output.stderr)
                    ),
                    output.status.code().unwrap_or(-1),
                    start.elapsed(),
                );
                outcome.stdout = stdout;
                return Ok(outcome);
            }
        }

        Ok(StepOutcome::success(stdout, start.elapsed(), vec![]))
    }

    async fn check_available(&self) -> Result<bool, ScrapeflowError> {
        Ok(true)
    }

    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError> {
        let Action::Setup { tools, install, .. } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Not a setup step".to_string(),
            });
        };

        if tools.iter().any(|t| t.trim().is_empty()) || install.iter().any(|c| c.trim().is_empty()) {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Setup contains an empty tool name or install command".to_string(),
            });
        }

        Ok(())
    }
}
