// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("scrapeflow").unwrap()
}

fn git(dir: &std::path::Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {:?}", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn initialized() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    cmd().current_dir(dir.path()).arg("init").assert().success();
    dir
}

#[test]
fn init_writes_settings_and_workflows() {
    let dir = initialized();

    assert!(dir.path().join("scrapeflow.toml").exists());
    assert!(dir.path().join(".scrapeflow/workflows/ac-scrape.yaml").exists());
    assert!(dir.path().join(".scrapeflow/workflows/smart-stream.yaml").exists());
    assert!(dir.path().join("ac_data").is_dir());
    let ignore = std::fs::read_to_string(dir.path().join(".scrapeflow/.gitignore")).unwrap();
    assert!(ignore.contains("runs/") && ignore.contains("artifacts/"));

    cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn validate_default_workflows() {
    let dir = initialized();
    cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(contains("ac-scrape"))
        .stdout(contains("All workflows are valid"));
}

#[test]
fn validate_reports_bad_cron() {
    let dir = initialized();
    std::fs::write(
        dir.path().join(".scrapeflow/workflows/broken.yaml"),
        "name: broken\non:\n  schedule:\n    - cron: \"61 * * * *\"\nsteps:\n  - name: s\n    action: {type: shell, command: \"true\"}\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(contains("Invalid schedule"));
}

#[test]
fn list_shows_schedules() {
    let dir = initialized();
    cmd()
        .args(["-C", &dir.path().to_string_lossy(), "list"])
        .assert()
        .success()
        .stdout(contains("smart-stream"))
        .stdout(contains("daily at 16:00 UTC"));
}

#[test]
fn run_dry_run_prints_plan() {
    let dir = initialized();
    cmd()
        .current_dir(dir.path())
        .args(["run", "ac-scrape", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("Execution plan (4 steps)"))
        .stdout(contains("publish"));

    assert!(!dir.path().join(".scrapeflow/runs").exists());
}

#[test]
fn run_unknown_workflow_fails() {
    let dir = initialized();
    cmd()
        .current_dir(dir.path())
        .args(["run", "nope"])
        .assert()
        .failure()
        .stderr(contains("nope"));
}

#[test]
fn run_records_history() {
    let dir = initialized();
    std::fs::write(
        dir.path().join(".scrapeflow/workflows/hello.yaml"),
        "name: hello\nsteps:\n  - name: greet\n    action: {type: shell, command: \"echo hi\"}\n",
    )
    .unwrap();

    cmd().current_dir(dir.path()).args(["run", "hello"]).assert().success();

    cmd()
        .current_dir(dir.path())
        .args(["history", "list", "-w", "hello"])
        .assert()
        .success()
        .stdout(contains("hello"))
        .stdout(contains("manual"));
}

#[test]
fn schedule_lists_fire_times() {
    let dir = initialized();
    cmd()
        .current_dir(dir.path())
        .args(["schedule", "-n", "1"])
        .assert()
        .success()
        .stdout(contains("ac-scrape"))
        .stdout(contains("0 12 * * *"));
}

#[test]
fn artifacts_list_empty() {
    let dir = initialized();
    cmd()
        .current_dir(dir.path())
        .args(["artifacts", "list"])
        .assert()
        .success()
        .stdout(contains("No artifacts stored"));
}

#[test]
fn repeated_runs_publish_nothing_when_unchanged() {
    if which::which("git").is_err() {
        return;
    }
    let dir = initialized();
    std::fs::write(
        dir.path().join(".scrapeflow/workflows/refresh.yaml"),
        "name: refresh\nsteps:\n  - name: scrape\n    action: {type: shell, command: \"true\"}\n  - name: publish\n    action: {type: publish, push: false}\n",
    )
    .unwrap();
    // Run records must stay out of commits even without the ignore file
    std::fs::remove_file(dir.path().join(".scrapeflow/.gitignore")).unwrap();

    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);

    for _ in 0..2 {
        cmd()
            .args(["-C", &dir.path().to_string_lossy(), "run", "refresh"])
            .assert()
            .success();
    }

    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "1");
    assert!(dir.path().join(".scrapeflow/runs").read_dir().unwrap().next().is_some());

    cmd()
        .current_dir(dir.path())
        .args(["-v", "history", "list", "-w", "refresh"])
        .assert()
        .success()
        .stdout(contains("no changes"));
}
