// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! FanGraphs major-league leaderboards
//!
//! Team batting splits by pitcher hand and the qualified pitcher
//! leaderboard share one endpoint.

use super::client::HttpClient;
use crate::data::{extract_records, Record};
use crate::errors::ScrapeflowError;

pub const LEADERS_URL: &str = "https://www.fangraphs.com/api/leaders/major-league/data";
const LEADERS_REFERER: &str = "https://www.fangraphs.com/leaders/major-league";

/// Team batting split against one pitcher hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    VsLhp,
    VsRhp,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::VsLhp, Split::VsRhp];

    /// FanGraphs encodes hand splits as pseudo-months
    pub fn month(self) -> u32 {
        match self {
            Self::VsLhp => 13,
            Self::VsRhp => 14,
        }
    }

    pub fn file_base(self) -> &'static str {
        match self {
            Self::VsLhp => "team_splits_vs_lhp",
            Self::VsRhp => "team_splits_vs_rhp",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VsLhp => write!(f, "vs LHP"),
            Self::VsRhp => write!(f, "vs RHP"),
        }
    }
}

fn season_window(season: i32) -> [(&'static str, String); 4] {
    [
        ("season", season.to_string()),
        ("season1", season.to_string()),
        ("startdate", format!("{}-03-01", season)),
        ("enddate", format!("{}-11-01", season)),
    ]
}

/// Query for team batting against one hand
pub fn team_splits_query(season: i32, split: Split) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("pos", "all".to_string()),
        ("stats", "bat".to_string()),
        ("lg", "all".to_string()),
        ("qual", "y".to_string()),
    ];
    query.extend(season_window(season));
    query.extend([
        ("month", split.month().to_string()),
        ("team", "0,ts".to_string()),
        ("pageitems", "30".to_string()),
        ("pagenum", "1".to_string()),
        ("ind", "0".to_string()),
        ("rost", "0".to_string()),
        ("type", "8".to_string()),
        ("sortdir", "default".to_string()),
        ("sortstat", "WAR".to_string()),
    ]);
    query
}

/// Query for qualified pitchers sorted by WAR
pub fn pitcher_leaders_query(season: i32) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("age", String::new()),
        ("pos", "all".to_string()),
        ("stats", "pit".to_string()),
        ("lg", "all".to_string()),
        ("qual", "y".to_string()),
    ];
    query.extend(season_window(season));
    query.extend([
        ("month", "0".to_string()),
        ("hand", String::new()),
        ("team", "0".to_string()),
        ("pageitems", "2000000000".to_string()),
        ("pagenum", "1".to_string()),
        ("ind", "0".to_string()),
        ("rost", "0".to_string()),
        ("players", String::new()),
        ("type", "8".to_string()),
        ("postseason", String::new()),
        ("sortdir", "default".to_string()),
        ("sortstat", "WAR".to_string()),
        ("download", "1".to_string()),
    ]);
    query
}

async fn fetch_leaders(
    client: &HttpClient,
    query: &[(&str, String)],
    what: &str,
) -> Result<Vec<Record>, ScrapeflowError> {
    let body = client
        .get_json(LEADERS_URL, query, &[("referer", LEADERS_REFERER.to_string())])
        .await?;

    extract_records(&body).ok_or_else(|| ScrapeflowError::UnexpectedResponse {
        source_name: format!("FanGraphs {}", what),
        reason: "response has no data list".to_string(),
    })
}

/// Team batting records against one pitcher hand
pub async fn fetch_team_splits(
    client: &HttpClient,
    season: i32,
    split: Split,
) -> Result<Vec<Record>, ScrapeflowError> {
    fetch_leaders(client, &team_splits_query(season, split), &format!("team splits {}", split)).await
}

/// Qualified pitcher leaderboard
pub async fn fetch_pitcher_leaders(client: &HttpClient, season: i32) -> Result<Vec<Record>, ScrapeflowError> {
    fetch_leaders(client, &pitcher_leaders_query(season), "pitcher leaders").await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'q>(query: &'q [(&str, String)], key: &str) -> &'q str {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str()).unwrap()
    }

    #[test]
    fn test_team_splits_query() {
        let lhp = team_splits_query(2025, Split::VsLhp);
        assert_eq!(value(&lhp, "month"), "13");
        assert_eq!(value(&lhp, "team"), "0,ts");
        assert_eq!(value(&lhp, "startdate"), "2025-03-01");
        assert_eq!(value(&lhp, "stats"), "bat");

        let rhp = team_splits_query(2025, Split::VsRhp);
        assert_eq!(value(&rhp, "month"), "14");
    }

    #[test]
    fn test_pitcher_leaders_query() {
        let query = pitcher_leaders_query(2024);
        assert_eq!(value(&query, "stats"), "pit");
        assert_eq!(value(&query, "type"), "8");
        assert_eq!(value(&query, "sortstat"), "WAR");
        assert_eq!(value(&query, "enddate"), "2024-11-01");
        assert_eq!(value(&query, "pageitems"), "2000000000");
    }
}
