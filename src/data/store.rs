// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Dated CSV snapshots

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::records::{Record, RecordTable};
use crate::errors::ScrapeflowError;

/// Whether a snapshot holds batters or pitchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Batter,
    Pitcher,
}

impl PlayerKind {
    /// Files with `batters` in the name hold batters; everything else pitchers
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("batters") {
            Self::Batter
        } else {
            Self::Pitcher
        }
    }
}

impl std::fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batter => write!(f, "batter"),
            Self::Pitcher => write!(f, "pitcher"),
        }
    }
}

/// A snapshot file found in the data directory
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub kind: PlayerKind,
}

/// Snapshot rows keyed by column name
pub type Row = HashMap<String, String>;

/// The data directory
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<(), ScrapeflowError> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|e| ScrapeflowError::FileWriteError {
                path: self.dir.clone(),
                error: e.to_string(),
            })?;
            tracing::info!("Created directory: {}", self.dir.display());
        }
        Ok(())
    }

    /// `<dir>/<YYYY-MM-DD>_<base>.csv`
    pub fn snapshot_path(&self, date: NaiveDate, base: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", date.format("%Y-%m-%d"), base))
    }

    /// Write records as a snapshot with `date` as the first column
    pub fn write_records(
        &self,
        date: NaiveDate,
        base: &str,
        records: &[Record],
    ) -> Result<PathBuf, ScrapeflowError> {
        self.ensure_dir()?;

        let mut table = RecordTable::from_records(records);
        table.prepend_column("date", &date.format("%Y-%m-%d").to_string());

        let path = self.snapshot_path(date, base);
        write_table(&path, &table)?;

        tracing::info!("Data saved to {} with {} rows", path.display(), table.len());
        Ok(path)
    }

    /// Every `<date>_*.csv` file, oldest first
    ///
    /// Files whose name does not start with a date are skipped.
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>, ScrapeflowError> {
        if !self.dir.is_dir() {
            return Ok(vec![]);
        }

        let pattern = self.dir.join("*.csv");
        let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .collect();
        paths.sort();

        let mut snapshots = Vec::new();
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let prefix = name.split('_').next().unwrap_or_default();
            match NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                Ok(date) => snapshots.push(Snapshot {
                    kind: PlayerKind::from_file_name(name),
                    date,
                    path,
                }),
                Err(_) => tracing::warn!("Skipping {}: no date prefix", name),
            }
        }

        Ok(snapshots)
    }
}

/// Write a table to a CSV file
pub fn write_table(path: &Path, table: &RecordTable) -> Result<(), ScrapeflowError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every row of a CSV file keyed by header
pub fn read_rows(path: &Path) -> Result<Vec<Row>, ScrapeflowError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_records_puts_date_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("ac_data"));
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let records: Vec<Record> = vec![
            json!({"Name": "Aaron Judge", "PA": 650, "Dollars": 48.2}),
            json!({"Name": "Juan Soto", "PA": 640}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let path = store.write_records(date, "fangraphs_batters", &records).unwrap();
        assert!(path.ends_with("ac_data/2025-05-01_fangraphs_batters.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("date,Name,PA,Dollars"));
        assert_eq!(lines.next(), Some("2025-05-01,Aaron Judge,650,48.2"));
        assert_eq!(lines.next(), Some("2025-05-01,Juan Soto,640,"));

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[1]["Name"], "Juan Soto");
        assert_eq!(rows[1]["Dollars"], "");
    }

    #[test]
    fn test_list_snapshots_parses_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("2025-05-02_fangraphs_pitchers.csv"), "date\n").unwrap();
        std::fs::write(dir.path().join("2025-05-01_fangraphs_batters.csv"), "date\n").unwrap();
        std::fs::write(dir.path().join("notes.csv"), "x\n").unwrap();
        std::fs::write(dir.path().join("2025-05-01_readme.txt"), "x\n").unwrap();

        let snapshots = store.list_snapshots().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].kind, PlayerKind::Batter);
        assert_eq!(snapshots[0].date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(snapshots[1].kind, PlayerKind::Pitcher);
    }

    #[test]
    fn test_read_rows_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splits.csv");
        std::fs::write(&path, "\u{feff}Tm,wRC+\nNYY,112\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0]["Tm"], "NYY");
    }

    #[test]
    fn test_missing_dir_has_no_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("absent"));
        assert!(store.list_snapshots().unwrap().is_empty());
    }
}
