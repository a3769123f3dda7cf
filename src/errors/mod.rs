// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Error types with actionable messages
//!
//! Every failure a run can hit carries a diagnostic code and, where we
//! know one, a concrete next step for the user.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scrapeflow operations
pub type ScrapeflowResult<T> = Result<T, ScrapeflowError>;

/// Main error type for scrapeflow
#[derive(Error, Debug, Diagnostic)]
pub enum ScrapeflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(
        code(scrapeflow::tool_not_found),
        help("{suggestion}")
    )]
    ToolNotFound {
        tool: String,
        suggestion: String,
    },

    #[error("Tool '{tool}' execution failed: {error}")]
    #[diagnostic(code(scrapeflow::tool_execution_failed))]
    ToolExecutionFailed {
        tool: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("No step runner registered for action: {action}")]
    #[diagnostic(
        code(scrapeflow::runner_not_found),
        help("Available actions: setup, shell, task, publish, artifact")
    )]
    RunnerNotFound { action: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Workflow Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Workflow '{name}' not found")]
    #[diagnostic(
        code(scrapeflow::workflow_not_found),
        help("Run 'scrapeflow list' to see the available workflows")
    )]
    WorkflowNotFound { name: String },

    #[error("Workflow directory not found: {path}")]
    #[diagnostic(
        code(scrapeflow::workflow_dir_not_found),
        help("Create the default workflows with 'scrapeflow init'")
    )]
    WorkflowDirNotFound { path: PathBuf },

    #[error("Invalid workflow configuration: {reason}")]
    #[diagnostic(code(scrapeflow::invalid_workflow))]
    InvalidWorkflow {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Step '{step}' is invalid: {reason}")]
    #[diagnostic(code(scrapeflow::invalid_step))]
    InvalidStep { step: String, reason: String },

    #[error("Step '{step}' not found in workflow")]
    #[diagnostic(code(scrapeflow::step_not_found))]
    StepNotFound { step: String },

    #[error("Invalid schedule '{expr}': {reason}")]
    #[diagnostic(
        code(scrapeflow::invalid_schedule),
        help("Schedules use five cron fields: minute hour day-of-month month day-of-week")
    )]
    InvalidSchedule { expr: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("git {command} failed: {stderr}")]
    #[diagnostic(code(scrapeflow::git_failed))]
    Git {
        command: String,
        stderr: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Scrape Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Request to {url} failed: {message}")]
    #[diagnostic(code(scrapeflow::http_error))]
    Http { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    #[diagnostic(code(scrapeflow::http_status))]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {source_name}: {reason}")]
    #[diagnostic(code(scrapeflow::unexpected_response))]
    UnexpectedResponse { source_name: String, reason: String },

    #[error("Environment variable {var} is not set")]
    #[diagnostic(code(scrapeflow::missing_credential))]
    MissingCredential {
        var: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    #[diagnostic(code(scrapeflow::file_not_found))]
    FileNotFound {
        path: PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(scrapeflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(scrapeflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // State Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Artifact error: {message}")]
    #[diagnostic(code(scrapeflow::artifact_error))]
    Artifact { message: String },

    #[error("Run history error: {message}")]
    #[diagnostic(code(scrapeflow::history_error))]
    History { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(scrapeflow::config_error))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(scrapeflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(scrapeflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(scrapeflow::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(scrapeflow::toml_error))]
    Toml { message: String },

    #[error("CSV error: {message}")]
    #[diagnostic(code(scrapeflow::csv_error))]
    Csv { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(scrapeflow::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for ScrapeflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ScrapeflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ScrapeflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for ScrapeflowError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<toml::ser::Error> for ScrapeflowError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<csv::Error> for ScrapeflowError {
    fn from(e: csv::Error) -> Self {
        Self::Csv { message: e.to_string() }
    }
}

impl From<glob::PatternError> for ScrapeflowError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl From<reqwest::Error> for ScrapeflowError {
    fn from(e: reqwest::Error) -> Self {
        let url = e
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::Http {
            url,
            message: e.to_string(),
        }
    }
}

impl ScrapeflowError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "git" => "Install git: https://git-scm.com/downloads".to_string(),
            "python" | "python3" => {
                "Install Python 3: https://www.python.org/downloads/".to_string()
            }
            "pip" | "pip3" => "Install pip: python3 -m ensurepip --upgrade".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }

    /// Create a git failure with a hint derived from its stderr
    pub fn git_failed(command: &str, stderr: String) -> Self {
        let help = Self::parse_git_error(&stderr);
        Self::Git {
            command: command.to_string(),
            stderr,
            help,
        }
    }

    /// Create a missing ESPN cookie error
    pub fn missing_espn_cookie(var: &str) -> Self {
        Self::MissingCredential {
            var: var.to_string(),
            help: Some(
                "Copy the espn_s2 and SWID cookies from a logged-in browser session \
                 into ESPN_S2 and ESPN_SWID"
                    .into(),
            ),
        }
    }

    /// A hint for a failed step, derived from its stderr
    pub fn hint_for_stderr(stderr: &str) -> Option<String> {
        Self::parse_git_error(stderr).or_else(|| Self::parse_python_error(stderr))
    }

    fn parse_git_error(stderr: &str) -> Option<String> {
        if stderr.contains("Please tell me who you are") {
            Some("Set [git] author_name and author_email in scrapeflow.toml".into())
        } else if stderr.contains("rejected") || stderr.contains("non-fast-forward") {
            Some("The remote has new commits. Pull before the next run.".into())
        } else if stderr.contains("Authentication failed") || stderr.contains("could not read Username") {
            Some("Push access is missing. Export GITHUB_TOKEN or configure a credential helper.".into())
        } else if stderr.contains("not a git repository") {
            Some("Run scrapeflow from inside the repository that stores the data".into())
        } else {
            None
        }
    }

    fn parse_python_error(stderr: &str) -> Option<String> {
        if stderr.contains("ModuleNotFoundError") {
            Some("A Python dependency is missing. Add its install command to the setup step.".into())
        } else if stderr.contains("No such file or directory") {
            Some("The script path is wrong or PYTHONPATH is not set for this step.".into())
        } else {
            None
        }
    }
}
