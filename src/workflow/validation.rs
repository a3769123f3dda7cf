// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Workflow validation
//!
//! Validates workflow configuration before execution.

use std::collections::HashSet;

use crate::trigger::CronSchedule;
use crate::workflow::{Action, Step, Workflow};

/// Workflow validator
pub struct WorkflowValidator;

impl WorkflowValidator {
    /// Validate a workflow configuration
    pub fn validate(workflow: &Workflow) -> ValidationResult {
        let mut result = ValidationResult::new();

        if workflow.steps.is_empty() {
            result.add_error("Workflow has no steps defined");
        }

        // Check for duplicate step names
        let mut seen_names = HashSet::new();
        for step in &workflow.steps {
            if !seen_names.insert(&step.name) {
                result.add_error(&format!("Duplicate step name: '{}'", step.name));
            }
        }

        Self::validate_triggers(workflow, &mut result);

        for step in &workflow.steps {
            Self::validate_step(step, &mut result);
        }

        Self::validate_ordering(workflow, &mut result);

        result
    }

    fn validate_triggers(workflow: &Workflow, result: &mut ValidationResult) {
        for entry in &workflow.triggers.schedule {
            if let Err(e) = CronSchedule::parse(&entry.cron) {
                result.add_error(&format!("Invalid schedule '{}': {}", entry.cron, e));
            }
        }

        if workflow.triggers.schedule.is_empty() && !workflow.triggers.manual {
            result.add_error("Workflow has no schedule and manual dispatch is disabled; it can never run");
        }
    }

    /// Validate a single step
    fn validate_step(step: &Step, result: &mut ValidationResult) {
        match &step.action {
            Action::Shell { command, .. } => {
                if command.trim().is_empty() {
                    result.add_error(&format!("Step '{}': Shell command is empty", step.name));
                }
            }
            Action::Setup { tools, install, .. } => {
                if tools.is_empty() && install.is_empty() {
                    result.add_warning(&format!("Step '{}': Setup step does nothing", step.name));
                }
            }
            Action::Publish { message, remote, .. } => {
                if message.trim().is_empty() {
                    result.add_error(&format!("Step '{}': Commit message is empty", step.name));
                }
                if remote.trim().is_empty() {
                    result.add_error(&format!("Step '{}': Remote name is empty", step.name));
                }
            }
            Action::Artifact { name, path, retention_days } => {
                if name.trim().is_empty() {
                    result.add_error(&format!("Step '{}': Artifact name is empty", step.name));
                }
                if path.as_os_str().is_empty() {
                    result.add_error(&format!("Step '{}': Artifact path is empty", step.name));
                }
                if *retention_days == 0 {
                    result.add_error(&format!(
                        "Step '{}': retention_days must be at least 1",
                        step.name
                    ));
                }
            }
            Action::Task { .. } => {}
        }
    }

    /// Warn about steps in an order that defeats their purpose
    fn validate_ordering(workflow: &Workflow, result: &mut ValidationResult) {
        let setups = indices(workflow, |a| matches!(a, Action::Setup { .. }));
        let work = indices(workflow, |a| matches!(a, Action::Task { .. } | Action::Shell { .. }));
        let publishes = indices(workflow, |a| matches!(a, Action::Publish { .. }));
        let artifacts = indices(workflow, |a| matches!(a, Action::Artifact { .. }));

        if let Some(&last_setup) = setups.last() {
            for &i in work.iter().filter(|&&i| i < last_setup) {
                result.add_warning(&format!(
                    "Step '{}': Runs before setup step '{}'",
                    workflow.steps[i].name, workflow.steps[last_setup].name
                ));
            }
        }

        for &p in &publishes {
            if !work.iter().any(|&i| i < p) {
                result.add_warning(&format!(
                    "Step '{}': Publishes without a preceding task or shell step",
                    workflow.steps[p].name
                ));
            }
        }

        if let Some(&first_publish) = publishes.first() {
            for &i in artifacts.iter().filter(|&&i| i < first_publish) {
                result.add_warning(&format!(
                    "Step '{}': Artifact uploaded before publish step '{}'",
                    workflow.steps[i].name, workflow.steps[first_publish].name
                ));
            }
        }
    }
}

fn indices(workflow: &Workflow, pred: impl Fn(&Action) -> bool) -> Vec<usize> {
    workflow
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| pred(&s.action))
        .map(|(i, _)| i)
        .collect()
}

/// Result of workflow validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> ValidationResult {
        WorkflowValidator::validate(&Workflow::from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_validate_empty_workflow() {
        let result = validate("name: empty\nsteps: []\n");
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no steps"));
    }

    #[test]
    fn test_validate_duplicate_names_and_bad_cron() {
        let result = validate(
            r#"
name: broken
on:
  schedule:
    - cron: "0 25 * * *"
steps:
  - name: dup
    action: { type: shell, command: "true" }
  - name: dup
    action: { type: shell, command: "  " }
"#,
        );
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
        assert!(result.errors.iter().any(|e| e.contains("Invalid schedule")));
        assert!(result.errors.iter().any(|e| e.contains("Shell command is empty")));
    }

    #[test]
    fn test_validate_unreachable_and_artifact_fields() {
        let result = validate(
            r#"
name: unreachable
on:
  manual: false
steps:
  - name: keep
    action: { type: artifact, name: "", path: ac_data, retention_days: 0 }
"#,
        );
        assert!(result.errors.iter().any(|e| e.contains("never run")));
        assert!(result.errors.iter().any(|e| e.contains("Artifact name is empty")));
        assert!(result.errors.iter().any(|e| e.contains("retention_days")));
    }

    #[test]
    fn test_validate_ordering_warnings() {
        let result = validate(
            r#"
name: shuffled
steps:
  - name: early
    action: { type: shell, command: "python ac_scrape.py" }
  - name: provision
    action: { type: setup, tools: [python3] }
  - name: upload
    action: { type: artifact, name: ac-data, path: ac_data }
  - name: publish
    action: { type: publish }
"#,
        );
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("before setup")));
        assert!(result.warnings.iter().any(|w| w.contains("before publish")));
        assert!(!result.warnings.iter().any(|w| w.contains("without a preceding")));
    }

    #[test]
    fn test_validate_publish_without_work() {
        let result = validate(
            r#"
name: idle
steps:
  - name: publish
    action: { type: publish }
"#,
        );
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("without a preceding")));
    }
}
