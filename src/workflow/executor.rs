// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Workflow executor
//!
//! Runs the steps of a workflow one after another, stopping at the first
//! failure that is not allowed to fail.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::errors::ScrapeflowError;
use crate::steps::{create_default_runners, StepOutcome, StepRunner};
use crate::trigger::Trigger;
use crate::workflow::{RunContext, Step, Workflow};

/// Workflow execution options
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Only show what would be done
    pub dry_run: bool,
    /// Only run specific steps
    pub steps: Vec<String>,
    /// Verbose output
    pub verbose: bool,
}

/// Final status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
    AllowedFailure,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::AllowedFailure => "allowed failure",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: String,
    pub action: String,
    pub status: StepStatus,
    /// `None` for skipped steps
    pub outcome: Option<StepOutcome>,
}

/// Result of executing a workflow
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub workflow: String,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Total execution time
    pub duration: Duration,
    /// Whether every executed step succeeded or was allowed to fail
    pub success: bool,
    /// Steps in execution order; steps after a fatal failure are absent
    pub steps: Vec<StepReport>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// Workflow executor
pub struct WorkflowExecutor {
    /// Registered runners by action type
    runners: HashMap<String, Box<dyn StepRunner>>,
}

impl WorkflowExecutor {
    /// Create an executor with no runners
    pub fn new() -> Self {
        Self {
            runners: HashMap::new(),
        }
    }

    /// Create an executor with the standard runner set
    pub fn with_default_runners() -> Self {
        Self {
            runners: create_default_runners(),
        }
    }

    /// Register a runner for an action type
    pub fn register_runner(&mut self, action: &str, runner: Box<dyn StepRunner>) {
        self.runners.insert(action.to_string(), runner);
    }

    /// Validate each step against its runner
    pub fn validate_steps(&self, workflow: &Workflow) -> Vec<ScrapeflowError> {
        workflow
            .steps
            .iter()
            .filter_map(|step| match self.runner_for(step) {
                Ok(runner) => runner.validate_step(step).err(),
                Err(e) => Some(e),
            })
            .collect()
    }

    /// Execute a workflow
    pub async fn execute(
        &self,
        workflow: &Workflow,
        ctx: &RunContext,
        options: &ExecutionOptions,
    ) -> Result<RunReport, ScrapeflowError> {
        let start = Instant::now();

        let selected = self.select_steps(workflow, &options.steps)?;

        // Print execution plan
        self.print_execution_plan(workflow, ctx, &selected);

        if options.dry_run {
            return Ok(RunReport {
                run_id: ctx.run_id.clone(),
                workflow: workflow.name.clone(),
                trigger: ctx.trigger.clone(),
                started_at: ctx.started_at,
                finished_at: ctx.started_at,
                duration: start.elapsed(),
                success: true,
                steps: vec![],
                dry_run: true,
            });
        }

        tracing::info!("Starting run {} ({})", ctx.run_id, ctx.trigger);

        let mut reports = Vec::with_capacity(selected.len());
        let mut all_success = true;

        for step in selected {
            let env = merged_env(workflow, step);

            if let Some(condition) = &step.condition {
                if !condition.is_met(&env, &ctx.working_dir) {
                    println!("  {} {} {}", "○".dimmed(), step.name.bold(), "(skipped)".dimmed());
                    tracing::debug!("Condition not met for step '{}'", step.name);
                    reports.push(StepReport {
                        name: step.name.clone(),
                        action: step.action_name().to_string(),
                        status: StepStatus::Skipped,
                        outcome: None,
                    });
                    continue;
                }
            }

            println!("  {} {}...", "→".blue(), step.name);

            let outcome = self.execute_step(step, ctx, &env).await?;

            let status = if outcome.success {
                println!(
                    "  {} {} ({:.2}s)",
                    "✓".green(),
                    step.name.bold(),
                    outcome.duration.as_secs_f64()
                );
                if options.verbose && !outcome.stdout.is_empty() {
                    println!("{}", outcome.stdout.trim_end().dimmed());
                }
                StepStatus::Succeeded
            } else {
                println!("  {} {} failed", "✗".red(), step.name.bold());

                if !outcome.stderr.is_empty() {
                    eprintln!("{}", outcome.stderr.trim_end().dimmed());
                }

                if step.allow_failure {
                    tracing::warn!("Step '{}' failed but is allowed to fail", step.name);
                    StepStatus::AllowedFailure
                } else {
                    StepStatus::Failed
                }
            };

            reports.push(StepReport {
                name: step.name.clone(),
                action: step.action_name().to_string(),
                status,
                outcome: Some(outcome),
            });

            if status == StepStatus::Failed {
                all_success = false;
                break;
            }
        }

        let duration = start.elapsed();

        // Print summary
        println!();
        if all_success {
            println!(
                "{}",
                format!("Workflow completed successfully in {:.2}s", duration.as_secs_f64()).green()
            );
        } else {
            println!(
                "{}",
                format!("Workflow failed after {:.2}s", duration.as_secs_f64()).red()
            );
        }

        Ok(RunReport {
            run_id: ctx.run_id.clone(),
            workflow: workflow.name.clone(),
            trigger: ctx.trigger.clone(),
            started_at: ctx.started_at,
            finished_at: Utc::now(),
            duration,
            success: all_success,
            steps: reports,
            dry_run: false,
        })
    }

    /// Steps to run, in workflow order
    fn select_steps<'w>(&self, workflow: &'w Workflow, names: &[String]) -> Result<Vec<&'w Step>, ScrapeflowError> {
        if names.is_empty() {
            return Ok(workflow.steps.iter().collect());
        }

        for name in names {
            if workflow.get_step(name).is_none() {
                return Err(ScrapeflowError::StepNotFound { step: name.clone() });
            }
        }

        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        Ok(workflow
            .steps
            .iter()
            .filter(|s| wanted.contains(s.name.as_str()))
            .collect())
    }

    fn runner_for(&self, step: &Step) -> Result<&dyn StepRunner, ScrapeflowError> {
        self.runners
            .get(step.action_name())
            .map(|r| r.as_ref())
            .ok_or_else(|| ScrapeflowError::RunnerNotFound {
                action: step.action_name().to_string(),
            })
    }

    /// Execute a single step; runner errors become failed outcomes
    async fn execute_step(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let runner = self.runner_for(step)?;
        let start = Instant::now();

        match runner.execute(step, ctx, env).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!("Step '{}' failed: {}", step.name, e);
                Ok(StepOutcome::failure(e.to_string(), 1, start.elapsed()))
            }
        }
    }

    /// Print the execution plan
    fn print_execution_plan(&self, workflow: &Workflow, ctx: &RunContext, steps: &[&Step]) {
        println!();
        println!("{}: {}", "Workflow".bold(), workflow.name);
        println!("{}", "═".repeat(50));
        println!("{} {} ({})", "Run:".dimmed(), ctx.run_id, ctx.trigger);
        println!(
            "Execution plan ({} step{}):",
            steps.len(),
            if steps.len() == 1 { "" } else { "s" }
        );
        println!();

        for (i, step) in steps.iter().enumerate() {
            print!("  {}. {} ({})", i + 1, step.name.bold(), step.action_name());

            if step.allow_failure {
                print!(" {}", "[allow failure]".dimmed());
            }

            println!();
        }

        println!();
    }

    /// Action types whose runners report their tools unavailable
    pub async fn check_tools(&self, workflow: &Workflow) -> Result<Vec<String>, ScrapeflowError> {
        let mut missing = Vec::new();

        let actions: HashSet<_> = workflow.steps.iter().map(|s| s.action_name()).collect();

        for action in actions {
            if let Some(runner) = self.runners.get(action) {
                match runner.check_available().await {
                    Ok(true) => {}
                    Ok(false) | Err(_) => missing.push(action.to_string()),
                }
            } else {
                missing.push(action.to_string());
            }
        }

        missing.sort();
        Ok(missing)
    }
}

impl Default for WorkflowExecutor {
    fn default() -> Self {
        Self::with_default_runners()
    }
}

/// Process env, then workflow env, then step env
fn merged_env(workflow: &Workflow, step: &Step) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = std::env::vars().collect();
    env.extend(workflow.env.clone());
    env.extend(step.env.clone());
    env
}
