// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Run command - dispatch a workflow by hand

use chrono::Utc;
use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::{report, Project};
use crate::errors::ScrapeflowError;
use crate::state::{fingerprint_dir, RunHistory, RunRecord};
use crate::trigger::Trigger;
use crate::workflow::{
    ExecutionOptions, RunContext, RunReport, StepStatus, Workflow, WorkflowExecutor,
    WorkflowValidator,
};

/// Validate, execute, and record one run of a workflow
///
/// Shared by `run`, `daemon` and `scrape`. Dry runs are not recorded.
pub async fn execute_workflow(
    project: &Project,
    workflow: &Workflow,
    trigger: Trigger,
    options: &ExecutionOptions,
) -> Result<RunReport> {
    let validation = WorkflowValidator::validate(workflow);

    if !validation.is_valid() {
        eprintln!("{}", "Workflow validation failed:".red().bold());
        for error in &validation.errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        return Err(miette::miette!("Workflow '{}' is invalid", workflow.name));
    }

    if validation.has_warnings() && options.verbose {
        eprintln!("{}", "Workflow warnings:".yellow().bold());
        for warning in &validation.warnings {
            eprintln!("  {} {}", "⚠".yellow(), warning);
        }
        eprintln!();
    }

    let executor = WorkflowExecutor::with_default_runners();

    if let Some(error) = executor.validate_steps(workflow).into_iter().next() {
        return Err(report(error));
    }

    let missing = executor.check_tools(workflow).await?;
    if !missing.is_empty() && !options.dry_run {
        eprintln!("{}", "Unavailable step runners:".red().bold());
        for action in &missing {
            eprintln!("  {} {}", "✗".red(), action);
        }
        return Err(miette::miette!("Required tools are not installed"));
    }

    let ctx = RunContext::new(
        &workflow.name,
        trigger,
        Utc::now(),
        &project.root,
        project.settings.clone(),
    );

    let run = executor.execute(workflow, &ctx, options).await.map_err(report)?;

    if !run.dry_run {
        let mut record = RunRecord::from(&run);
        record.data_fingerprint = fingerprint_dir(&project.paths.data_dir)?;

        let history = RunHistory::new(project.paths.runs_dir());
        let path = history.store(&record)?;
        tracing::debug!("Run recorded at {}", path.display());
    }

    Ok(run)
}

/// Point at the step that stopped the run
pub fn print_failure(report: &RunReport) {
    if let Some(step) = report.steps.iter().find(|s| s.status == StepStatus::Failed) {
        eprintln!();
        eprintln!("{}", format!("Step '{}' stopped the run", step.name).red().bold());
        if let Some(hint) = step
            .outcome
            .as_ref()
            .and_then(|o| ScrapeflowError::hint_for_stderr(&o.stderr))
        {
            eprintln!("  {} {}", "→".blue(), hint);
        }
        eprintln!(
            "{}",
            format!("See 'scrapeflow history list -w {}' for earlier runs", report.workflow).dimmed()
        );
    }
}

/// Run the workflow
pub async fn run(
    workflow_name: String,
    steps: Vec<String>,
    dry_run: bool,
    config: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let project = Project::load(config)?;
    let workflows = project.workflows()?;
    let workflow = workflows.get(&workflow_name)?;

    if !workflow.triggers.manual {
        return Err(miette::miette!(
            "Workflow '{}' does not allow manual dispatch (on.manual is false)",
            workflow.name
        ));
    }

    let options = ExecutionOptions {
        dry_run,
        steps,
        verbose,
    };

    let report = execute_workflow(&project, workflow, Trigger::Manual, &options).await?;

    if !report.success {
        print_failure(&report);
        return Err(miette::miette!("Workflow '{}' failed", workflow.name));
    }

    let outputs: Vec<_> = report
        .steps
        .iter()
        .filter_map(|s| s.outcome.as_ref())
        .flat_map(|o| o.outputs.iter())
        .collect();

    if !outputs.is_empty() {
        println!();
        println!("{}:", "Outputs".bold());
        for output in outputs {
            println!("  - {}", output.display());
        }
    }

    Ok(())
}
