// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Analyses over scraped data
//!
//! - [`stream`]: streaming starter recommendations for the coming week
//! - [`changes`]: first-to-latest projection changes and anomalies

pub mod changes;
pub mod stream;

pub use changes::{
    calculate_changes, identify_anomalies, load_observations, render_summary, summary_stats,
    Anomaly, AnomalyType, Observation, PlayerChange, ProjectionReport, ANOMALIES_FILE,
    CHANGES_FILE, SUMMARY_FILE,
};
pub use stream::{
    is_available, load_handedness, load_team_splits, recommend, render_report,
    team_splits_from_records, team_splits_from_rows, DayOptions, GameOptions, Hand, SplitStats,
    StreamCriteria, StreamInputs, StreamOption, TeamSplits,
};
