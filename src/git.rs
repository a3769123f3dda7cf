// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Change publisher
//!
//! Thin wrapper over the `git` client: stage, compare against the last
//! commit, and commit/push only when the staged tree differs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

use crate::config::GitConfig;
use crate::errors::ScrapeflowError;

/// What a publish attempt did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Staged tree matched the last commit
    NoChanges,
    /// A commit was created
    Committed { commit: String, pushed: bool },
}

impl std::fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoChanges => write!(f, "no changes"),
            Self::Committed { commit, pushed } => {
                let short = &commit[..commit.len().min(8)];
                if *pushed {
                    write!(f, "committed {} and pushed", short)
                } else {
                    write!(f, "committed {}", short)
                }
            }
        }
    }
}

/// A git working tree
pub struct GitRepo {
    dir: PathBuf,
    author_name: String,
    author_email: String,
    env: HashMap<String, String>,
    exclude: Vec<String>,
}

impl GitRepo {
    pub fn new(dir: &Path, config: &GitConfig) -> Self {
        Self {
            dir: dir.to_path_buf(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
            env: HashMap::new(),
            exclude: Vec::new(),
        }
    }

    /// Environment for every git invocation (credentials, SSH command, author overrides)
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Self {
        self.env = env.clone();
        self
    }

    /// Never stage these directories
    ///
    /// Directories outside the working tree are ignored.
    pub fn excluding<'a>(mut self, dirs: impl IntoIterator<Item = &'a Path>) -> Self {
        for dir in dirs {
            if let Ok(relative) = dir.strip_prefix(&self.dir) {
                if !relative.as_os_str().is_empty() {
                    self.exclude.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        self
    }

    async fn git(&self, args: &[&str]) -> Result<Output, ScrapeflowError> {
        tracing::debug!("git {}", args.join(" "));

        Command::new("git")
            .args(args)
            .envs(&self.env)
            .current_dir(&self.dir)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScrapeflowError::tool_not_found("git")
                } else {
                    ScrapeflowError::ToolExecutionFailed {
                        tool: "git".to_string(),
                        error: e.to_string(),
                        help: None,
                    }
                }
            })
    }

    async fn git_ok(&self, args: &[&str]) -> Result<String, ScrapeflowError> {
        let output = self.git(args).await?;
        if !output.status.success() {
            return Err(ScrapeflowError::git_failed(
                args.first().copied().unwrap_or("git"),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Whether the directory is inside a work tree
    pub async fn is_repository(&self) -> bool {
        matches!(
            self.git_ok(&["rev-parse", "--is-inside-work-tree"]).await.as_deref(),
            Ok("true")
        )
    }

    /// Pathspecs for `git add`: `paths` (or the whole tree) minus excluded directories
    fn pathspecs(&self, paths: &[String]) -> Vec<String> {
        let mut specs: Vec<String> = if paths.is_empty() {
            vec![".".to_string()]
        } else {
            paths.to_vec()
        };
        specs.extend(self.exclude.iter().map(|dir| format!(":(exclude){}", dir)));
        specs
    }

    /// Stage `paths`, or every change when `paths` is empty
    pub async fn stage(&self, paths: &[String]) -> Result<(), ScrapeflowError> {
        let specs = self.pathspecs(paths);
        let mut args = vec!["add", "-A", "--"];
        args.extend(specs.iter().map(String::as_str));
        self.git_ok(&args).await.map(|_| ())
    }

    /// `git diff --staged --quiet`: exit 0 means nothing staged
    pub async fn has_staged_changes(&self) -> Result<bool, ScrapeflowError> {
        let output = self.git(&["diff", "--staged", "--quiet"]).await?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ScrapeflowError::git_failed(
                "diff",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }

    /// Commit the index and return the new commit id
    pub async fn commit(&self, message: &str) -> Result<String, ScrapeflowError> {
        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        self.git_ok(&["-c", &name, "-c", &email, "commit", "-m", message])
            .await?;
        self.git_ok(&["rev-parse", "HEAD"]).await
    }

    /// Push the current branch to `remote`
    pub async fn push(&self, remote: &str) -> Result<(), ScrapeflowError> {
        self.git_ok(&["push", remote, "HEAD"]).await.map(|_| ())
    }

    /// Stage, compare, and commit/push only when something changed
    pub async fn publish(
        &self,
        paths: &[String],
        message: &str,
        push: bool,
        remote: &str,
    ) -> Result<PublishOutcome, ScrapeflowError> {
        self.stage(paths).await?;

        if !self.has_staged_changes().await? {
            tracing::info!("No changes to commit");
            return Ok(PublishOutcome::NoChanges);
        }

        let commit = self.commit(message).await?;
        tracing::info!("Committed {}: {}", &commit[..commit.len().min(8)], message);

        if push {
            self.push(remote).await?;
            tracing::info!("Pushed to {}", remote);
        }

        Ok(PublishOutcome::Committed { commit, pushed: push })
    }
}
