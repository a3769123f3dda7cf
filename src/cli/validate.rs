// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Validate command - check workflow definitions

use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::Project;
use crate::utils::{print_error, print_success};
use crate::workflow::{WorkflowExecutor, WorkflowValidator};

/// Run the validate command
pub async fn run(only: Option<String>, config: Option<&Path>, verbose: bool) -> Result<()> {
    println!("{}", "Validating workflows...".bold());
    println!();

    let project = Project::load(config)?;
    let workflows = match project.workflows() {
        Ok(set) => set,
        Err(e) => {
            eprintln!("  {} Failed to load workflows", "✗".red());
            eprintln!();
            return Err(e);
        }
    };

    if workflows.is_empty() {
        return Err(miette::miette!(
            "No workflows in {}\n\n\
             Run 'scrapeflow init' to create the default workflows.",
            project.paths.workflows_dir.display()
        ));
    }

    let executor = WorkflowExecutor::with_default_runners();
    let mut invalid = 0;

    for (path, workflow) in &workflows.workflows {
        if only.as_deref().is_some_and(|name| name != workflow.name) {
            continue;
        }

        let validation = WorkflowValidator::validate(workflow);
        let step_errors = executor.validate_steps(workflow);

        if validation.is_valid() && step_errors.is_empty() {
            print_success(&format!("{} ({})", workflow.name.bold(), path.display()));
        } else {
            invalid += 1;
            print_error(&format!("{} ({})", workflow.name.bold(), path.display()));
            for error in &validation.errors {
                println!("      {} {}", "✗".red(), error);
            }
            for error in &step_errors {
                println!("      {} {}", "✗".red(), error);
            }
        }

        for warning in &validation.warnings {
            println!("      {} {}", "⚠".yellow(), warning);
        }

        if verbose {
            for step in &workflow.steps {
                println!("      - {} ({})", step.name, step.action_name().dimmed());
            }
        }
    }

    if let Some(name) = &only {
        workflows.get(name)?;
    }

    println!();

    if invalid > 0 {
        Err(miette::miette!("{} workflow(s) failed validation", invalid))
    } else {
        println!("{}", "All workflows are valid!".green().bold());
        Ok(())
    }
}
