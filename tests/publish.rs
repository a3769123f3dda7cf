// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Commit-if-changed behaviour against a real git repository

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use scrapeflow::config::Settings;
use scrapeflow::git::PublishOutcome;
use scrapeflow::trigger::Trigger;
use scrapeflow::workflow::{ExecutionOptions, RunContext, StepStatus, Workflow, WorkflowExecutor};

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {:?}: {}", args, String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn repo() -> Option<tempfile::TempDir> {
    if which::which("git").is_err() {
        eprintln!("git not installed, skipping");
        return None;
    }

    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    std::fs::create_dir_all(dir.path().join("ac_data")).unwrap();
    std::fs::write(dir.path().join("ac_data/2025-04-30_fangraphs_batters.csv"), "date\n2025-04-30\n").unwrap();
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    Some(dir)
}

fn workflow(scrape_command: &str, push: bool) -> Workflow {
    Workflow::from_yaml(&format!(
        r#"
name: ac-scrape
steps:
  - name: provision
    action:
      type: setup
      tools: [git]
  - name: scrape
    action:
      type: shell
      command: "{}"
  - name: publish
    action:
      type: publish
      paths: [ac_data]
      push: {}
"#,
        scrape_command, push
    ))
    .unwrap()
}

/// Publishes every change in the tree, as the smart-stream workflow does
fn whole_tree_workflow(scrape_command: &str) -> Workflow {
    Workflow::from_yaml(&format!(
        r#"
name: smart-stream
env:
  GIT_AUTHOR_NAME: Scrape Bot
steps:
  - name: scrape
    action:
      type: shell
      command: "{}"
  - name: publish
    action:
      type: publish
      push: false
"#,
        scrape_command
    ))
    .unwrap()
}

fn context(dir: &Path) -> RunContext {
    RunContext::new(
        "ac-scrape",
        Trigger::Manual,
        Utc.with_ymd_and_hms(2025, 5, 1, 16, 0, 0).unwrap(),
        dir,
        Arc::new(Settings::default()),
    )
}

fn publish_outcome(report: &scrapeflow::workflow::RunReport) -> Option<PublishOutcome> {
    report
        .step("publish")
        .and_then(|s| s.outcome.as_ref())
        .and_then(|o| o.publish.clone())
}

#[tokio::test]
async fn unchanged_data_makes_no_commit() {
    let Some(dir) = repo() else { return };
    let executor = WorkflowExecutor::with_default_runners();

    let report = executor
        .execute(&workflow("true", false), &context(dir.path()), &ExecutionOptions::default())
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(publish_outcome(&report), Some(PublishOutcome::NoChanges));
    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "1");
}

#[tokio::test]
async fn changed_data_makes_one_commit() {
    let Some(dir) = repo() else { return };
    let executor = WorkflowExecutor::with_default_runners();

    let report = executor
        .execute(
            &workflow("echo 2025-05-01 > ac_data/2025-05-01_fangraphs_batters.csv", false),
            &context(dir.path()),
            &ExecutionOptions::default(),
        )
        .await
        .unwrap();

    assert!(report.success);
    assert!(matches!(
        publish_outcome(&report),
        Some(PublishOutcome::Committed { pushed: false, .. })
    ));
    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "2");
    assert_eq!(git(dir.path(), &["log", "-1", "--format=%s"]), "Daily scrape: 2025-05-01");
}

#[tokio::test]
async fn files_outside_paths_are_not_committed() {
    let Some(dir) = repo() else { return };
    let executor = WorkflowExecutor::with_default_runners();

    let report = executor
        .execute(&workflow("echo scratch > notes.txt", false), &context(dir.path()), &ExecutionOptions::default())
        .await
        .unwrap();

    assert_eq!(publish_outcome(&report), Some(PublishOutcome::NoChanges));
    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "1");
}

#[tokio::test]
async fn commit_is_pushed_to_remote() {
    let Some(dir) = repo() else { return };
    let remote = tempfile::tempdir().unwrap();
    git(remote.path(), &["init", "-q", "--bare"]);
    git(dir.path(), &["remote", "add", "origin", &remote.path().to_string_lossy()]);

    let executor = WorkflowExecutor::with_default_runners();
    let report = executor
        .execute(
            &workflow("echo 2025-05-01 > ac_data/2025-05-01_fangraphs_batters.csv", true),
            &context(dir.path()),
            &ExecutionOptions::default(),
        )
        .await
        .unwrap();

    assert!(report.success);
    let Some(PublishOutcome::Committed { commit, pushed }) = publish_outcome(&report) else {
        panic!("Expected a commit");
    };
    assert!(pushed);

    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    assert_eq!(git(remote.path(), &["rev-parse", &branch]), commit);
}

#[tokio::test]
async fn failed_setup_blocks_the_scrape() {
    let Some(dir) = repo() else { return };
    let mut workflow = workflow("echo ran > marker.txt", false);
    workflow.steps[0] = Workflow::from_yaml(
        r#"
name: broken
steps:
  - name: provision
    action:
      type: setup
      tools: [scrapeflow-test-missing-tool]
"#,
    )
    .unwrap()
    .steps
    .remove(0);

    let executor = WorkflowExecutor::with_default_runners();
    let report = executor
        .execute(&workflow, &context(dir.path()), &ExecutionOptions::default())
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.step("provision").map(|s| s.status), Some(StepStatus::Failed));
    assert!(report.step("scrape").is_none());
    assert!(report.step("publish").is_none());
    assert!(!dir.path().join("marker.txt").exists());
}

#[tokio::test]
async fn whole_tree_publish_skips_state_dir() {
    let Some(dir) = repo() else { return };
    let state = dir.path().join(".scrapeflow");
    std::fs::create_dir_all(state.join("runs")).unwrap();
    std::fs::write(state.join("runs/20250430T120000Z-smart-stream.json"), "{}").unwrap();
    std::fs::create_dir_all(state.join("artifacts/ac-data/run/files")).unwrap();
    std::fs::write(state.join("artifacts/ac-data/run/files/batters.csv"), "date\n").unwrap();

    let executor = WorkflowExecutor::with_default_runners();

    for _ in 0..2 {
        let report = executor
            .execute(&whole_tree_workflow("true"), &context(dir.path()), &ExecutionOptions::default())
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(publish_outcome(&report), Some(PublishOutcome::NoChanges));
        std::fs::write(state.join("runs/20250501T120000Z-smart-stream.json"), "{}").unwrap();
    }
    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "1");

    let report = executor
        .execute(
            &whole_tree_workflow("echo report > smartstream_results.txt"),
            &context(dir.path()),
            &ExecutionOptions::default(),
        )
        .await
        .unwrap();
    assert!(matches!(publish_outcome(&report), Some(PublishOutcome::Committed { .. })));
    assert_eq!(
        git(dir.path(), &["show", "--name-only", "--format=", "HEAD"]),
        "smartstream_results.txt"
    );
}

#[tokio::test]
async fn workflow_env_reaches_git() {
    let Some(dir) = repo() else { return };
    let executor = WorkflowExecutor::with_default_runners();

    let report = executor
        .execute(
            &whole_tree_workflow("echo report > smartstream_results.txt"),
            &context(dir.path()),
            &ExecutionOptions::default(),
        )
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(git(dir.path(), &["log", "-1", "--format=%an"]), "Scrape Bot");
}
