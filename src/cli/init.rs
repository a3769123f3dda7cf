// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Init command - write settings and the default workflows

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::config::{Settings, CONFIG_FILE};
use crate::utils::print_success;

/// Daily auction calculator scrape
pub const AC_SCRAPE_WORKFLOW: &str = r#"name: ac-scrape
description: Daily FanGraphs auction calculator scrape
on:
  schedule:
    - cron: "0 16 * * *"
  manual: true
env:
  PYTHONPATH: "."
steps:
  - name: provision
    action:
      type: setup
      tools: [git]
  - name: scrape
    action:
      type: task
      task:
        kind: auction-scrape
  - name: publish
    action:
      type: publish
      paths: [ac_data]
      message: "Daily scrape: {date}"
      push: true
  - name: upload
    action:
      type: artifact
      name: ac-data
      path: ac_data
      retention_days: 30
"#;

/// Daily streaming-pitcher report
pub const SMART_STREAM_WORKFLOW: &str = r#"name: smart-stream
description: Weekly streaming starter report, refreshed daily
on:
  schedule:
    - cron: "0 12 * * *"
  manual: true
env:
  PYTHONPATH: "."
steps:
  - name: provision
    action:
      type: setup
      tools: [git]
  - name: stream
    action:
      type: task
      task:
        kind: smart-stream
        output: smartstream_results.txt
  - name: publish
    action:
      type: publish
      message: "Daily scrape: {date}"
      push: true
"#;

/// Keeps run records and artifact copies out of published commits
pub const STATE_GITIGNORE: &str = "runs/\nartifacts/\n";

fn write_file(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!("  {} {} exists, kept", "○".dimmed(), path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            miette::miette!("Failed to create directory '{}': {}", parent.display(), e)
        })?;
    }

    std::fs::write(path, content)
        .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
    print_success(&format!("Created {}", path.display()));
    Ok(true)
}

/// Run the init command
pub async fn run(force: bool, verbose: bool) -> Result<()> {
    println!("{}", "Initializing scrapeflow project...".bold());
    println!();

    if Path::new(CONFIG_FILE).exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            CONFIG_FILE
        ));
    }

    let settings = Settings::default();
    write_file(Path::new(CONFIG_FILE), &settings.to_toml()?, force)?;

    let workflows_dir = &settings.paths.workflows_dir;
    for (file, content) in [
        ("ac-scrape.yaml", AC_SCRAPE_WORKFLOW),
        ("smart-stream.yaml", SMART_STREAM_WORKFLOW),
    ] {
        write_file(&workflows_dir.join(file), content, force)?;
    }

    write_file(&settings.paths.state_dir.join(".gitignore"), STATE_GITIGNORE, force)?;

    let data_dir = &settings.paths.data_dir;
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            miette::miette!("Failed to create directory '{}': {}", data_dir.display(), e)
        })?;
        print_success(&format!("Created {}/", data_dir.display()));
    }

    println!();
    println!("{}", "Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Set {} and {} for the smart-stream workflow", "ESPN_S2".cyan(), "ESPN_SWID".cyan());
    println!("  2. Run {} to try a workflow", "scrapeflow run ac-scrape --dry-run".cyan());
    println!("  3. Run {} to fire workflows on schedule", "scrapeflow daemon".cyan());
    println!();

    if verbose {
        println!("{}:", "Settings".bold());
        println!("{}", settings.to_toml()?.dimmed());
    }

    Ok(())
}
