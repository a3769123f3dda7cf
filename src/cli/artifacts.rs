// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Artifacts command - inspect and prune the artifact store

use chrono::Utc;
use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::{ArtifactsAction, Project};
use crate::artifacts::ArtifactStore;
use crate::utils::{format_size, print_header, print_success};

/// Run the artifacts command
pub async fn run(action: ArtifactsAction, config: Option<&Path>, verbose: bool) -> Result<()> {
    let project = Project::load(config)?;
    let store = ArtifactStore::new(project.paths.artifacts_dir());
    let now = Utc::now();

    match action {
        ArtifactsAction::List => {
            let artifacts = store.list()?;

            print_header("Artifacts");
            println!("  Location: {}", store.root().display());
            println!();

            if artifacts.is_empty() {
                println!("{}", "  No artifacts stored.".dimmed());
                return Ok(());
            }

            for (dir, manifest) in &artifacts {
                let expiry = if manifest.is_expired(&now) {
                    "expired".red().to_string()
                } else {
                    format!("expires {}", manifest.expires_at.format("%Y-%m-%d"))
                };

                println!(
                    "  {} {}  {} files, {}  {}",
                    manifest.name.bold(),
                    manifest.run_id.dimmed(),
                    manifest.files.len(),
                    format_size(manifest.total_size()),
                    expiry
                );

                if verbose {
                    println!("    {}", dir.display());
                    for file in &manifest.files {
                        println!("    - {} ({})", file.path, &file.blake3[..file.blake3.len().min(12)]);
                    }
                }
            }

            Ok(())
        }

        ArtifactsAction::Prune => {
            let removed = store.prune_expired(&now)?;

            if removed.is_empty() {
                println!("{}", "No expired artifacts.".dimmed());
            } else {
                for manifest in &removed {
                    print_success(&format!("Removed {}/{}", manifest.name, manifest.run_id));
                }
                println!();
                println!("{}", format!("Pruned {} artifact(s).", removed.len()).green());
            }

            Ok(())
        }
    }
}
