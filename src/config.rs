// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Settings loading
//!
//! Settings come from `scrapeflow.toml` in the working directory, then the
//! user configuration directory, then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ScrapeflowError;

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "scrapeflow.toml";

/// Top-level settings from scrapeflow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where workflows, run state, and data live
    #[serde(default)]
    pub paths: PathsConfig,

    /// HTTP client behaviour
    #[serde(default)]
    pub http: HttpConfig,

    /// Commit identity for published changes
    #[serde(default)]
    pub git: GitConfig,

    /// ESPN fantasy league coordinates
    #[serde(default)]
    pub espn: EspnConfig,

    /// FanGraphs query defaults
    #[serde(default)]
    pub fangraphs: FangraphsConfig,
}

/// Directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,

    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workflows_dir: default_workflows_dir(),
            state_dir: default_state_dir(),
            data_dir: default_data_dir(),
        }
    }
}

impl PathsConfig {
    /// Resolve every path against a base directory
    pub fn resolve(&self, base: &Path) -> Self {
        Self {
            workflows_dir: base.join(&self.workflows_dir),
            state_dir: base.join(&self.state_dir),
            data_dir: base.join(&self.data_dir),
        }
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.state_dir.join("runs")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.state_dir.join("artifacts")
    }
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(".scrapeflow/workflows")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".scrapeflow")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("ac_data")
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between consecutive requests to the same site
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/18.1.1 Safari/605.1.15"
        .to_string()
}

/// Commit identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

fn default_author_name() -> String {
    "scrapeflow".to_string()
}

fn default_author_email() -> String {
    "scrapeflow@users.noreply.github.com".to_string()
}

/// ESPN league settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspnConfig {
    #[serde(default = "default_league_id")]
    pub league_id: u64,

    #[serde(default = "default_espn_season")]
    pub season: i32,

    /// Scoring period used for ranks; omitted from the query when unset
    #[serde(default)]
    pub scoring_period: Option<u32>,

    /// Maximum number of free agents requested
    #[serde(default = "default_player_limit")]
    pub player_limit: u32,
}

impl Default for EspnConfig {
    fn default() -> Self {
        Self {
            league_id: default_league_id(),
            season: default_espn_season(),
            scoring_period: None,
            player_limit: default_player_limit(),
        }
    }
}

fn default_league_id() -> u64 {
    27130
}

fn default_espn_season() -> i32 {
    2025
}

fn default_player_limit() -> u32 {
    500
}

/// FanGraphs settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FangraphsConfig {
    /// Season for leaderboard queries (defaults to the current year)
    #[serde(default)]
    pub season: Option<i32>,
}

impl Settings {
    /// Load settings, honouring an explicit path first
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> Result<Self, ScrapeflowError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ScrapeflowError::FileNotFound {
                    path: path.to_path_buf(),
                    help: Some("Pass an existing file to --config".into()),
                });
            }
            return Self::from_file(path);
        }

        let local = base_dir.join(CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Loading settings from {}", local.display());
            return Self::from_file(&local);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "scrapeflow") {
            let user = dirs.config_dir().join("config.toml");
            if user.exists() {
                tracing::debug!("Loading settings from {}", user.display());
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ScrapeflowError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScrapeflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ScrapeflowError::Config {
            message: format!("{}: {}", path.display(), e),
            help: Some("Compare with the file written by 'scrapeflow init'".into()),
        })
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ScrapeflowError> {
        toml::from_str(content).map_err(Into::into)
    }

    /// Serialize settings to TOML
    pub fn to_toml(&self) -> Result<String, ScrapeflowError> {
        toml::to_string_pretty(self).map_err(Into::into)
    }

    /// Season for FanGraphs queries
    pub fn fangraphs_season(&self, today: chrono::NaiveDate) -> i32 {
        use chrono::Datelike;
        self.fangraphs.season.unwrap_or_else(|| today.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.paths.data_dir, PathBuf::from("ac_data"));
        assert_eq!(settings.http.timeout_secs, 30);
        assert_eq!(settings.espn.scoring_period, None);
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_toml(
            r#"
[paths]
data_dir = "snapshots"

[espn]
league_id = 42
scoring_period = 157
"#,
        )
        .unwrap();

        assert_eq!(settings.paths.data_dir, PathBuf::from("snapshots"));
        assert_eq!(settings.paths.state_dir, PathBuf::from(".scrapeflow"));
        assert_eq!(settings.espn.league_id, 42);
        assert_eq!(settings.espn.scoring_period, Some(157));
    }

    #[test]
    fn test_load_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[git]\nauthor_name = \"bot\"\n").unwrap();

        let settings = Settings::load(None, dir.path()).unwrap();
        assert_eq!(settings.git.author_name, "bot");
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Settings::load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_fangraphs_season_falls_back_to_today() {
        let settings = Settings::default();
        let today = chrono::NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        assert_eq!(settings.fangraphs_season(today), 2026);
    }
}
