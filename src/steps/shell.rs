// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Shell runner
//!
//! Runs external scripts such as `python ac_scrape.py`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Output;
use std::time::Instant;
use tokio::process::Command;

use super::{StepOutcome, StepRunner};
use crate::errors::ScrapeflowError;
use crate::workflow::{Action, RunContext, Step};

/// Run `shell -c command` in `working_dir` with `env` layered on the process environment
pub async fn run_shell(
    shell: &str,
    command: &str,
    working_dir: &Path,
    env: &HashMap<String, String>,
) -> Result<Output, ScrapeflowError> {
    tracing::debug!("{} -c {}", shell, command);

    Command::new(shell)
        .arg("-c")
        .arg(command)
        .current_dir(working_dir)
        .envs(env)
        .output()
        .await
        .map_err(|e| ScrapeflowError::ToolExecutionFailed {
            tool: shell.to_string(),
            error: e.to_string(),
            help: Some(format!("Shell '{}' may not be available", shell)),
        })
}

/// Shell runner
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepRunner for ShellRunner {
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let Action::Shell { command, shell } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Expected shell action".to_string(),
            });
        };

        let start = Instant::now();
        let output = run_shell(shell, command, &ctx.working_dir, env).await?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(StepOutcome {
            success: output.status.success(),
            stdout,
            stderr,
            exit_code: output.status.code().unwrap_or(-1),
            outputs: vec![],
            duration,
            publish: None,
        })
    }

    async fn check_available(&self) -> Result<bool, ScrapeflowError> {
        Ok(which::which("bash").is_ok() || which::which("sh").is_ok())
    }

    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError> {
        let Action::Shell { command, .. } = &step.action else {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Not a shell step".to_string(),
            });
        };

        if command.trim().is_empty() {
            return Err(ScrapeflowError::InvalidStep {
                step: step.name.clone(),
                reason: "Shell command is empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::{context, step};

    fn shell_step(command: &str) -> Step {
        step(
            "script",
            Action::Shell {
                command: command.into(),
                shell: "bash".into(),
            },
        )
    }

    #[test]
    fn test_validate_empty_command_fails() {
        let runner = ShellRunner::new();
        assert!(runner.validate_step(&shell_step("echo hi")).is_ok());
        assert!(runner.validate_step(&shell_step("  ")).is_err());
    }

    #[tokio::test]
    async fn test_execute_passes_env() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ShellRunner::new();
        let mut env = HashMap::new();
        env.insert("PYTHONPATH".to_string(), "/opt/scrapers".to_string());

        let outcome = runner
            .execute(&shell_step("echo $PYTHONPATH"), &context(dir.path()), &env)
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.stdout.contains("/opt/scrapers"));
    }

    #[tokio::test]
    async fn test_execute_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ShellRunner::new()
            .execute(&shell_step("echo boom >&2; exit 3"), &context(dir.path()), &HashMap::new())
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, 3);
        assert!(outcome.stderr.contains("boom"));
    }
}
