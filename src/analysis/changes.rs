// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Projection change analysis
//!
//! Compares each player's first and most recent auction snapshot and
//! flags projections that moved in unusual ways.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::data::{read_rows, DataStore, PlayerKind, Row};
use crate::errors::ScrapeflowError;

pub const ANOMALIES_FILE: &str = "projection_anomalies.csv";
pub const CHANGES_FILE: &str = "all_projection_changes.csv";
pub const SUMMARY_FILE: &str = "projection_summary_stats.csv";

/// One player row from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub kind: PlayerKind,
    pub date: NaiveDate,
    pub pa: f64,
    pub pts: f64,
    pub team: String,
    pub position: String,
}

/// First-to-last change for one player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerChange {
    pub player_name: String,
    pub player_type: PlayerKind,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub days_tracked: i64,
    pub first_pa: f64,
    pub last_pa: f64,
    pub first_pts: f64,
    pub last_pts: f64,
    pub pa_change: f64,
    pub pts_change: f64,
    pub pa_pct_change: f64,
    pub pts_pct_change: f64,
    pub pts_per_pa_change: f64,
    pub pa_change_per_day: f64,
    pub pts_change_per_day: f64,
    pub team: String,
    pub position: String,
}

const CHANGE_COLUMNS: [&str; 18] = [
    "player_name",
    "player_type",
    "first_date",
    "last_date",
    "days_tracked",
    "first_PA",
    "last_PA",
    "first_PTS",
    "last_PTS",
    "pa_change",
    "pts_change",
    "pa_pct_change",
    "pts_pct_change",
    "pts_per_pa_change",
    "pa_change_per_day",
    "pts_change_per_day",
    "team",
    "position",
];

impl PlayerChange {
    fn csv_row(&self) -> Vec<String> {
        vec![
            self.player_name.clone(),
            self.player_type.to_string(),
            self.first_date.to_string(),
            self.last_date.to_string(),
            self.days_tracked.to_string(),
            self.first_pa.to_string(),
            self.last_pa.to_string(),
            self.first_pts.to_string(),
            self.last_pts.to_string(),
            self.pa_change.to_string(),
            self.pts_change.to_string(),
            self.pa_pct_change.to_string(),
            self.pts_pct_change.to_string(),
            self.pts_per_pa_change.to_string(),
            self.pa_change_per_day.to_string(),
            self.pts_change_per_day.to_string(),
            self.team.clone(),
            self.position.clone(),
        ]
    }
}

/// Kinds of suspicious projection movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnomalyType {
    /// |PA%| >= 15 or |PA| >= 30
    MajorPaChange,
    /// |PTS%| >= 10 while |PA%| < 8
    PtsWithoutPaChange,
    /// PTS fell more than 1.5x what the PA drop explains
    UnusualPtsDrop,
}

impl AnomalyType {
    pub fn label(self) -> &'static str {
        match self {
            Self::MajorPaChange => "Major PA Change",
            Self::PtsWithoutPaChange => "PTS Change Without PA Change",
            Self::UnusualPtsDrop => "Unusual PTS Drop Rate",
        }
    }

    /// Magnitude used to rank rows of this type
    ///
    /// Types whose label mentions PA rank by |PA%|, the rest by |PTS%|.
    fn magnitude(self, change: &PlayerChange) -> f64 {
        match self {
            Self::MajorPaChange | Self::PtsWithoutPaChange => change.pa_pct_change.abs(),
            Self::UnusualPtsDrop => change.pts_pct_change.abs(),
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub kind: AnomalyType,
    pub change: PlayerChange,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r">([^<]+)<").expect("valid name pattern"))
}

/// Display name: text inside the `Name` link, else `PlayerName`
pub fn clean_name(row: &Row) -> Option<String> {
    row.get("Name")
        .and_then(|name| name_pattern().captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| row.get("PlayerName").filter(|n| !n.is_empty()).cloned())
}

fn observation(row: &Row, kind: PlayerKind, date: NaiveDate) -> Option<Observation> {
    let number = |key: &str| row.get(key).and_then(|v| v.trim().parse::<f64>().ok());

    Some(Observation {
        name: clean_name(row)?,
        kind,
        date,
        pa: number("PA")?,
        pts: number("PTS")?,
        team: row.get("Team").cloned().unwrap_or_default(),
        position: row
            .get("POS")
            .or_else(|| row.get("aPOS"))
            .cloned()
            .unwrap_or_default(),
    })
}

/// Every usable player row in the data directory
///
/// The date comes from the file name. Rows without a name or numeric
/// PA and PTS are ignored; unreadable files are logged and skipped.
pub fn load_observations(store: &DataStore) -> Result<Vec<Observation>, ScrapeflowError> {
    let mut observations = Vec::new();

    for snapshot in store.list_snapshots()? {
        let rows = match read_rows(&snapshot.path) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Error loading {}: {}", snapshot.path.display(), e);
                continue;
            }
        };

        let before = observations.len();
        observations.extend(
            rows.iter()
                .filter_map(|row| observation(row, snapshot.kind, snapshot.date)),
        );
        tracing::info!(
            "Loaded {}: {} records",
            snapshot.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            observations.len() - before
        );
    }

    Ok(observations)
}

/// First-to-last changes per (name, kind), sorted by name then kind
///
/// Players seen on a single date are left out.
pub fn calculate_changes(observations: &[Observation]) -> Vec<PlayerChange> {
    let mut groups: BTreeMap<(&str, PlayerKind), Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        groups.entry((obs.name.as_str(), obs.kind)).or_default().push(obs);
    }

    groups
        .into_iter()
        .filter_map(|((name, kind), mut group)| {
            if group.len() < 2 {
                return None;
            }
            group.sort_by_key(|o| o.date);

            let first = group.first()?;
            let last = group.last()?;
            if first.date == last.date {
                return None;
            }

            let pa_change = last.pa - first.pa;
            let pts_change = last.pts - first.pts;
            let days = (last.date - first.date).num_days();
            let per_day = |delta: f64| if days > 0 { delta / days as f64 } else { 0.0 };
            let pct = |delta: f64, base: f64| if base > 0.0 { delta / base * 100.0 } else { 0.0 };

            Some(PlayerChange {
                player_name: name.to_string(),
                player_type: kind,
                first_date: first.date,
                last_date: last.date,
                days_tracked: days,
                first_pa: first.pa,
                last_pa: last.pa,
                first_pts: first.pts,
                last_pts: last.pts,
                pa_change,
                pts_change,
                pa_pct_change: pct(pa_change, first.pa),
                pts_pct_change: pct(pts_change, first.pts),
                pts_per_pa_change: if pa_change != 0.0 { pts_change / pa_change } else { 0.0 },
                pa_change_per_day: per_day(pa_change),
                pts_change_per_day: per_day(pts_change),
                team: last.team.clone(),
                position: last.position.clone(),
            })
        })
        .collect()
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Flag anomalies; one player can appear under several types
pub fn identify_anomalies(changes: &[PlayerChange]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    let flag = |kind: AnomalyType, change: &PlayerChange| Anomaly {
        kind,
        change: change.clone(),
    };

    anomalies.extend(
        changes
            .iter()
            .filter(|c| c.pa_pct_change.abs() >= 15.0 || c.pa_change.abs() >= 30.0)
            .map(|c| flag(AnomalyType::MajorPaChange, c)),
    );

    anomalies.extend(
        changes
            .iter()
            .filter(|c| c.pts_pct_change.abs() >= 10.0 && c.pa_pct_change.abs() < 8.0)
            .map(|c| flag(AnomalyType::PtsWithoutPaChange, c)),
    );

    // Baseline PTS-per-PA among players whose PA and PTS both fell
    let declining: Vec<&PlayerChange> = changes
        .iter()
        .filter(|c| c.pa_change < 0.0 && c.pts_change < 0.0)
        .collect();
    let baseline = |kind: PlayerKind| {
        median(
            declining
                .iter()
                .filter(|c| c.player_type == kind)
                .map(|c| c.pts_per_pa_change)
                .collect(),
        )
    };
    let batter_baseline = baseline(PlayerKind::Batter);
    let pitcher_baseline = baseline(PlayerKind::Pitcher);

    anomalies.extend(
        declining
            .iter()
            .filter(|c| {
                let rate = match c.player_type {
                    PlayerKind::Batter => batter_baseline,
                    PlayerKind::Pitcher => pitcher_baseline,
                };
                rate.is_some_and(|b| c.pts_change.abs() > (c.pa_change * b * 1.5).abs())
            })
            .map(|c| flag(AnomalyType::UnusualPtsDrop, *c)),
    );

    anomalies
}

/// Aggregate metrics written to the summary CSV
pub fn summary_stats(changes: &[PlayerChange], anomalies: &[Anomaly]) -> Vec<(&'static str, f64)> {
    let n = changes.len() as f64;
    let mean = |f: fn(&PlayerChange) -> f64| {
        if changes.is_empty() {
            0.0
        } else {
            changes.iter().map(f).sum::<f64>() / n
        }
    };
    let max = |f: fn(&PlayerChange) -> f64| changes.iter().map(f).fold(f64::NEG_INFINITY, f64::max);
    let min = |f: fn(&PlayerChange) -> f64| changes.iter().map(f).fold(f64::INFINITY, f64::min);

    vec![
        ("Total Players", n),
        ("Total Anomalies", anomalies.len() as f64),
        ("Avg PA Change", mean(|c| c.pa_change)),
        ("Avg PTS Change", mean(|c| c.pts_change)),
        ("Max PA Increase", max(|c| c.pa_change)),
        ("Max PA Decrease", min(|c| c.pa_change)),
        ("Max PTS Increase", max(|c| c.pts_change)),
        ("Max PTS Decrease", min(|c| c.pts_change)),
        ("Avg Days Tracked", mean(|c| c.days_tracked as f64)),
        ("Players with PA Increases", changes.iter().filter(|c| c.pa_change > 0.0).count() as f64),
        ("Players with PTS Increases", changes.iter().filter(|c| c.pts_change > 0.0).count() as f64),
    ]
}

/// Printable report, top `top` rows per anomaly type by magnitude
pub fn render_summary(changes: &[PlayerChange], anomalies: &[Anomaly], top: usize) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "SMART STREAM PROJECTION CHANGE REPORT");
    let _ = writeln!(out, "First Date to Most Recent Analysis");
    let _ = writeln!(out, "{}", rule);

    if let (Some(first), Some(last)) = (
        changes.iter().map(|c| c.first_date).min(),
        changes.iter().map(|c| c.last_date).max(),
    ) {
        let _ = writeln!(out, "Analysis Period: {} to {}", first, last);
        let _ = writeln!(out, "Total Players Analyzed: {}", changes.len());
        let _ = writeln!(out);
    }

    if anomalies.is_empty() {
        let _ = writeln!(out, "No significant anomalies detected in the data.");
        return out;
    }

    let mut by_type: BTreeMap<AnomalyType, Vec<&PlayerChange>> = BTreeMap::new();
    for anomaly in anomalies {
        by_type.entry(anomaly.kind).or_default().push(&anomaly.change);
    }

    for (kind, mut group) in by_type {
        group.sort_by(|a, b| kind.magnitude(b).total_cmp(&kind.magnitude(a)));

        let _ = writeln!(out, "\n{}:", kind.label().to_uppercase());
        let _ = writeln!(out, "{}", "-".repeat(50));

        for c in group.into_iter().take(top) {
            let _ = writeln!(out, "  {} ({}) - {} to {}", c.player_name, c.team, c.first_date, c.last_date);
            let _ = writeln!(
                out,
                "    PA: {:.0} → {:.0} ({:+.0}, {:+.1}%)",
                c.first_pa, c.last_pa, c.pa_change, c.pa_pct_change
            );
            let _ = writeln!(
                out,
                "    PTS: {:.1} → {:.1} ({:+.1}, {:+.1}%)",
                c.first_pts, c.last_pts, c.pts_change, c.pts_pct_change
            );
            let _ = writeln!(out, "    Days Tracked: {}", c.days_tracked);
            let _ = writeln!(out);
        }
    }

    out
}

/// The full analysis of one data directory
#[derive(Debug, Clone)]
pub struct ProjectionReport {
    pub changes: Vec<PlayerChange>,
    pub anomalies: Vec<Anomaly>,
}

impl ProjectionReport {
    pub fn analyze(store: &DataStore) -> Result<Self, ScrapeflowError> {
        let observations = load_observations(store)?;
        let changes = calculate_changes(&observations);
        let anomalies = identify_anomalies(&changes);
        Ok(Self { changes, anomalies })
    }

    pub fn render(&self, top: usize) -> String {
        render_summary(&self.changes, &self.anomalies, top)
    }

    /// Write the CSV reports; the anomaly file only when there are anomalies
    pub fn write_outputs(&self, dir: &Path) -> Result<Vec<PathBuf>, ScrapeflowError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        if !self.anomalies.is_empty() {
            let path = dir.join(ANOMALIES_FILE);
            let mut writer = csv::Writer::from_path(&path)?;
            let mut header: Vec<&str> = CHANGE_COLUMNS.to_vec();
            header.push("anomaly_type");
            writer.write_record(&header)?;
            for anomaly in &self.anomalies {
                let mut row = anomaly.change.csv_row();
                row.push(anomaly.kind.label().to_string());
                writer.write_record(&row)?;
            }
            writer.flush()?;
            tracing::info!("Saved {} anomalies to '{}'", self.anomalies.len(), path.display());
            written.push(path);
        }

        let path = dir.join(CHANGES_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CHANGE_COLUMNS)?;
        for change in &self.changes {
            writer.write_record(change.csv_row())?;
        }
        writer.flush()?;
        tracing::info!("Saved {} total changes to '{}'", self.changes.len(), path.display());
        written.push(path);

        let path = dir.join(SUMMARY_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["Metric", "Value"])?;
        for (metric, value) in summary_stats(&self.changes, &self.anomalies) {
            writer.write_record([metric.to_string(), value.to_string()])?;
        }
        writer.flush()?;
        written.push(path);

        Ok(written)
    }
}
