// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

use super::ScrapeflowError;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// The suggestion matching an error, if there is one
    pub fn for_error(error: &ScrapeflowError) -> Option<Self> {
        match error {
            ScrapeflowError::ToolNotFound { tool, .. } => Some(Self::install_tool(tool)),
            ScrapeflowError::WorkflowDirNotFound { .. } => Some(Self::create_workflows()),
            ScrapeflowError::MissingCredential { .. } => Some(Self::set_espn_cookies()),
            ScrapeflowError::Git { command, .. } if command == "push" => Some(Self::configure_push()),
            ScrapeflowError::Yaml { .. } => Some(Self::fix_yaml_syntax(None, None)),
            _ => None,
        }
    }

    /// Suggest installing a missing tool
    pub fn install_tool(tool: &str) -> Self {
        match tool {
            "git" => Self {
                action: "Install git".into(),
                steps: vec![
                    "git is required to publish scraped data".into(),
                    "Choose an installation method below".into(),
                ],
                commands: vec![
                    "# Debian/Ubuntu:".into(),
                    "sudo apt-get install git".into(),
                    "".into(),
                    "# Homebrew (macOS/Linux):".into(),
                    "brew install git".into(),
                ],
            },
            "python" | "python3" => Self {
                action: "Install Python 3".into(),
                steps: vec![
                    "Shell steps that run Python scripts need an interpreter".into(),
                    "Install Python 3 and make sure 'python3' is on PATH".into(),
                ],
                commands: vec![
                    "# Debian/Ubuntu:".into(),
                    "sudo apt-get install python3 python3-pip".into(),
                ],
            },
            _ => Self {
                action: format!("Install {}", tool),
                steps: vec![format!("Install {} and ensure it's in your PATH", tool)],
                commands: vec![],
            },
        }
    }

    /// Suggest creating the default workflows
    pub fn create_workflows() -> Self {
        Self {
            action: "Create workflow definitions".into(),
            steps: vec![
                "No workflows were found in the workflows directory".into(),
                "Scaffold the defaults or write a YAML file by hand".into(),
            ],
            commands: vec![
                "# Scaffold ac-scrape and smart-stream:".into(),
                "scrapeflow init".into(),
            ],
        }
    }

    /// Suggest exporting the ESPN cookies
    pub fn set_espn_cookies() -> Self {
        Self {
            action: "Export ESPN league cookies".into(),
            steps: vec![
                "Private leagues only answer authenticated requests".into(),
                "Copy espn_s2 and SWID from your browser's cookie store".into(),
            ],
            commands: vec![
                "export ESPN_S2='<espn_s2 cookie>'".into(),
                "export ESPN_SWID='{<swid cookie>}'".into(),
            ],
        }
    }

    /// Suggest granting push access
    pub fn configure_push() -> Self {
        Self {
            action: "Grant push access to the data repository".into(),
            steps: vec![
                "Publishing pushes the commit to the configured remote".into(),
                "Provide a token or disable push in the publish step".into(),
            ],
            commands: vec![
                "export GITHUB_TOKEN='<token with contents:write>'".into(),
                "git config credential.helper store".into(),
            ],
        }
    }

    /// Suggest fixing invalid YAML
    pub fn fix_yaml_syntax(line: Option<usize>, column: Option<usize>) -> Self {
        let location = match (line, column) {
            (Some(l), Some(c)) => format!(" at line {}, column {}", l, c),
            (Some(l), None) => format!(" at line {}", l),
            _ => String::new(),
        };

        Self {
            action: format!("Fix YAML syntax error{}", location),
            steps: vec![
                "Check for common YAML issues:".into(),
                "  • Incorrect indentation (use spaces, not tabs)".into(),
                "  • Unquoted cron expressions starting with '*'".into(),
                "  • Missing 'type' inside a step action".into(),
            ],
            commands: vec![
                "# Re-check the workflow:".into(),
                "scrapeflow validate".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
