// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Workflow definition structures
//!
//! Defines the schema for workflow YAML files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::ScrapeflowError;
use crate::sources::AuctionSettings;
use crate::trigger::CronSchedule;

/// Workflow definition from a YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Workflow name
    pub name: String,

    /// Workflow description
    #[serde(default)]
    pub description: Option<String>,

    /// What fires the workflow
    #[serde(default, rename = "on")]
    pub triggers: Triggers,

    /// Steps in execution order
    pub steps: Vec<Step>,

    /// Global environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_version() -> String {
    "1".to_string()
}

impl Workflow {
    /// Load a workflow from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ScrapeflowError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScrapeflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a workflow from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ScrapeflowError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the workflow to YAML
    pub fn to_yaml(&self) -> Result<String, ScrapeflowError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get a step by name
    pub fn get_step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Get all step names
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Parse every schedule entry
    pub fn schedules(&self) -> Result<Vec<CronSchedule>, ScrapeflowError> {
        self.triggers
            .schedule
            .iter()
            .map(|entry| CronSchedule::parse(&entry.cron))
            .collect()
    }

    /// The schedule that fires during `now`'s minute, if any
    pub fn due_schedule(&self, now: &DateTime<Utc>) -> Result<Option<CronSchedule>, ScrapeflowError> {
        Ok(self.schedules()?.into_iter().find(|s| s.matches(now)))
    }

    /// Whether any schedule fires during `now`'s minute
    pub fn is_due(&self, now: &DateTime<Utc>) -> Result<bool, ScrapeflowError> {
        Ok(self.due_schedule(now)?.is_some())
    }

    /// Earliest fire time after `after` across all schedules
    pub fn next_fire(&self, after: &DateTime<Utc>) -> Result<Option<(DateTime<Utc>, CronSchedule)>, ScrapeflowError> {
        Ok(self
            .schedules()?
            .into_iter()
            .filter_map(|s| s.next_after(after).map(|t| (t, s)))
            .min_by_key(|(t, _)| *t))
    }
}

/// Trigger configuration (`on:` block)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triggers {
    /// Cron schedules, evaluated in UTC
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,

    /// Allow manual dispatch
    #[serde(default = "default_true")]
    pub manual: bool,
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            schedule: vec![],
            manual: true,
        }
    }
}

/// A single schedule entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub cron: String,
}

fn default_true() -> bool {
    true
}

/// A single workflow step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step name (must be unique within the workflow)
    pub name: String,

    /// Step description
    #[serde(default)]
    pub description: Option<String>,

    /// What the step does
    pub action: Action,

    /// Environment variables for this step
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Continue the run even if this step fails
    #[serde(default)]
    pub allow_failure: bool,

    /// Condition for running this step
    #[serde(default)]
    pub condition: Option<StepCondition>,
}

impl Step {
    /// Get the runner name for this step
    pub fn action_name(&self) -> &str {
        self.action.kind()
    }
}

/// Step actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Check tools and install dependencies
    Setup {
        /// Executables that must be on PATH
        #[serde(default)]
        tools: Vec<String>,

        /// Install commands, run in order
        #[serde(default)]
        install: Vec<String>,

        #[serde(default = "default_shell")]
        shell: String,
    },

    /// Run an external command or script
    Shell {
        command: String,

        #[serde(default = "default_shell")]
        shell: String,
    },

    /// Run a built-in task
    Task { task: NativeTask },

    /// Commit and push changes when the staged tree differs
    Publish {
        /// Paths to stage; empty stages every change
        #[serde(default)]
        paths: Vec<String>,

        /// Commit message template
        #[serde(default = "default_message")]
        message: String,

        #[serde(default = "default_true")]
        push: bool,

        #[serde(default = "default_remote")]
        remote: String,
    },

    /// Keep a copy of a directory in the artifact store
    Artifact {
        name: String,

        path: PathBuf,

        #[serde(default = "default_retention_days")]
        retention_days: u32,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "setup",
            Self::Shell { .. } => "shell",
            Self::Task { .. } => "task",
            Self::Publish { .. } => "publish",
            Self::Artifact { .. } => "artifact",
        }
    }
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_message() -> String {
    "Daily scrape: {date}".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_retention_days() -> u32 {
    30
}

/// Built-in tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NativeTask {
    /// FanGraphs auction calculator, batters and pitchers
    AuctionScrape(AuctionSettings),
    /// Team batting splits vs LHP and RHP
    TeamSplits(SeasonTask),
    /// Qualified pitcher leaderboard
    PitcherLeaders(SeasonTask),
    /// Weekly streaming-pitcher report
    SmartStream(StreamTask),
    /// First-to-last projection change analysis
    ProjectionChanges(ChangesTask),
}

impl NativeTask {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuctionScrape(_) => "auction-scrape",
            Self::TeamSplits(_) => "team-splits",
            Self::PitcherLeaders(_) => "pitcher-leaders",
            Self::SmartStream(_) => "smart-stream",
            Self::ProjectionChanges(_) => "projection-changes",
        }
    }
}

impl std::fmt::Display for NativeTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Tasks parameterised only by season
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonTask {
    pub season: Option<i32>,
}

/// Streaming report inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTask {
    /// Report file
    pub output: PathBuf,
    /// Team split CSVs; fetched live when unset
    pub lhp_stats: Option<PathBuf>,
    pub rhp_stats: Option<PathBuf>,
    /// Pitcher handedness lists (first column is the name)
    pub left_handed: Option<PathBuf>,
    pub right_handed: Option<PathBuf>,
    /// Days of schedule to scan
    pub days: u32,
    /// An opponent below this wRC+ is a target
    pub max_wrc_plus: f64,
    /// An opponent above this K% is a target
    pub min_k_percent: f64,
}

impl Default for StreamTask {
    fn default() -> Self {
        Self {
            output: PathBuf::from("smartstream_results.txt"),
            lhp_stats: None,
            rhp_stats: None,
            left_handed: None,
            right_handed: None,
            days: 7,
            max_wrc_plus: 100.0,
            min_k_percent: 22.0,
        }
    }
}

/// Projection change analysis outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesTask {
    /// Directory for the CSV reports
    pub output_dir: PathBuf,
    /// Rows shown per anomaly type in the printed summary
    pub top: usize,
}

impl Default for ChangesTask {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            top: 15,
        }
    }
}

/// Condition for running a step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCondition {
    /// Run only if file exists
    FileExists(PathBuf),
    /// Run only if environment variable is set
    EnvSet(String),
    /// Run only if environment variable equals value
    EnvEquals { var: String, value: String },
    /// Always run (default)
    Always,
    /// Never run (skip)
    Never,
}

impl StepCondition {
    /// Evaluate against the step's merged environment
    pub fn is_met(&self, env: &HashMap<String, String>, working_dir: &Path) -> bool {
        match self {
            Self::FileExists(path) => working_dir.join(path).exists(),
            Self::EnvSet(var) => env.get(var).is_some_and(|v| !v.is_empty()),
            Self::EnvEquals { var, value } => env.get(var) == Some(value),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const AC_SCRAPE: &str = r#"
name: ac-scrape
on:
  schedule:
    - cron: "0 16 * * *"
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
  - name: upload
    action:
      type: artifact
      name: ac-data
      path: ac_data
"#;

    #[test]
    fn test_parse_ac_scrape() {
        let workflow = Workflow::from_yaml(AC_SCRAPE).unwrap();
        assert_eq!(workflow.name, "ac-scrape");
        assert!(workflow.triggers.manual);
        assert_eq!(workflow.step_names(), vec!["provision", "scrape", "publish", "upload"]);

        match &workflow.steps[1].action {
            Action::Task { task: NativeTask::AuctionScrape(settings) } => {
                assert_eq!(settings.teams, 10);
                assert_eq!(settings.projection, "ratcdc");
            }
            other => panic!("Expected auction task, got {:?}", other),
        }

        match &workflow.steps[2].action {
            Action::Publish { paths, message, push, remote } => {
                assert_eq!(paths, &vec!["ac_data".to_string()]);
                assert_eq!(message, "Daily scrape: {date}");
                assert!(*push);
                assert_eq!(remote, "origin");
            }
            other => panic!("Expected publish, got {:?}", other),
        }

        match &workflow.steps[3].action {
            Action::Artifact { retention_days, .. } => assert_eq!(*retention_days, 30),
            other => panic!("Expected artifact, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_stream_task_overrides() {
        let yaml = r#"
name: smart-stream
steps:
  - name: report
    action:
      type: task
      task:
        kind: smart-stream
        lhp_stats: splits_lhp.csv
        days: 3
"#;
        let workflow = Workflow::from_yaml(yaml).unwrap();
        match &workflow.steps[0].action {
            Action::Task { task: NativeTask::SmartStream(task) } => {
                assert_eq!(task.lhp_stats, Some(PathBuf::from("splits_lhp.csv")));
                assert_eq!(task.days, 3);
                assert_eq!(task.output, PathBuf::from("smartstream_results.txt"));
            }
            other => panic!("Expected stream task, got {:?}", other),
        }
    }

    #[test]
    fn test_next_fire_picks_earliest_schedule() {
        let yaml = r#"
name: twice
on:
  schedule:
    - cron: "0 16 * * *"
    - cron: "0 12 * * *"
steps: []
"#;
        let workflow = Workflow::from_yaml(yaml).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let (time, schedule) = workflow.next_fire(&after).unwrap().unwrap();
        assert_eq!(time, Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(schedule.expr(), "0 12 * * *");

        let noon = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 30).unwrap();
        assert!(workflow.due_schedule(&noon).unwrap().is_some());
        assert!(!workflow.is_due(&after).unwrap());
    }

    #[test]
    fn test_conditions() {
        let mut env = HashMap::new();
        env.insert("ESPN_S2".to_string(), "cookie".to_string());
        let dir = Path::new(".");

        assert!(StepCondition::EnvSet("ESPN_S2".into()).is_met(&env, dir));
        assert!(!StepCondition::EnvSet("ESPN_SWID".into()).is_met(&env, dir));
        assert!(StepCondition::EnvEquals { var: "ESPN_S2".into(), value: "cookie".into() }.is_met(&env, dir));
        assert!(!StepCondition::Never.is_met(&env, dir));
    }
}
