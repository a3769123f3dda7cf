// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! FanGraphs auction calculator

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::client::HttpClient;
use crate::data::{extract_records, Record};
use crate::errors::ScrapeflowError;

pub const AUCTION_URL: &str = "https://www.fangraphs.com/api/fantasy/auction-calculator/data";
const AUCTION_REFERER: &str = "https://www.fangraphs.com/fantasy-tools/auction-calculator";

/// Scoring categories sent with every request
const POINTS: &str = "c|0,1,2,3,4,7,9|0,13,2,3,4";
/// Positions eligible for the utility slot
const PRIMARY_POSITIONS: &str = "C,SS,2B,3B,OF,1B";
/// Roster slot counts
const ROSTER_SLOTS: &str = "1,1,1,1,5,1,1,1,0,1,5,2,2,5,0";

/// League settings for the auction calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionSettings {
    /// Snapshot directory; the configured data directory when unset
    pub output_dir: Option<PathBuf>,
    pub teams: u32,
    /// MLB, AL or NL
    pub league: String,
    pub dollars: u32,
    pub min_batter: u32,
    pub min_pitcher: u32,
    pub min_sp: u32,
    pub min_rp: u32,
    /// Projection system
    pub projection: String,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            teams: 10,
            league: "MLB".to_string(),
            dollars: 1000,
            min_batter: 1,
            min_pitcher: 20,
            min_sp: 5,
            min_rp: 5,
            projection: "ratcdc".to_string(),
        }
    }
}

/// Which half of the player pool to value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerType {
    Batters,
    Pitchers,
}

impl PlayerType {
    pub fn code(self) -> &'static str {
        match self {
            Self::Batters => "bat",
            Self::Pitchers => "pit",
        }
    }

    /// Snapshot base name
    pub fn file_base(self) -> &'static str {
        match self {
            Self::Batters => "fangraphs_batters",
            Self::Pitchers => "fangraphs_pitchers",
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batters => write!(f, "batter"),
            Self::Pitchers => write!(f, "pitcher"),
        }
    }
}

/// Query string for one auction calculator request
pub fn auction_query(settings: &AuctionSettings, player_type: PlayerType) -> Vec<(&'static str, String)> {
    vec![
        ("teams", settings.teams.to_string()),
        ("lg", settings.league.clone()),
        ("dollars", settings.dollars.to_string()),
        ("mb", settings.min_batter.to_string()),
        ("mp", settings.min_pitcher.to_string()),
        ("msp", settings.min_sp.to_string()),
        ("mrp", settings.min_rp.to_string()),
        ("type", player_type.code().to_string()),
        ("players", String::new()),
        ("proj", settings.projection.clone()),
        ("split", String::new()),
        ("points", POINTS.to_string()),
        ("rep", "0".to_string()),
        ("drp", "0".to_string()),
        ("pp", PRIMARY_POSITIONS.to_string()),
        ("pos", ROSTER_SLOTS.to_string()),
        ("sort", String::new()),
        ("view", "0".to_string()),
    ]
}

/// Fetch auction values; `None` when the body has no `data` list
pub async fn fetch_auction(
    client: &HttpClient,
    settings: &AuctionSettings,
    player_type: PlayerType,
) -> Result<Option<Vec<Record>>, ScrapeflowError> {
    let query = auction_query(settings, player_type);
    let body = client
        .get_json(AUCTION_URL, &query, &[("referer", AUCTION_REFERER.to_string())])
        .await?;

    let records = extract_records(&body);
    if records.is_none() {
        let keys: Vec<String> = body
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        tracing::warn!(
            "No {} data found or data is not in the expected format (keys: {})",
            player_type,
            keys.join(", ")
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_for_pitchers() {
        let query = auction_query(&AuctionSettings::default(), PlayerType::Pitchers);
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("type"), "pit");
        assert_eq!(get("teams"), "10");
        assert_eq!(get("lg"), "MLB");
        assert_eq!(get("mp"), "20");
        assert_eq!(get("proj"), "ratcdc");
        assert_eq!(get("points"), "c|0,1,2,3,4,7,9|0,13,2,3,4");
        assert_eq!(get("players"), "");
        assert_eq!(query.len(), 18);
    }

    #[test]
    fn test_settings_from_partial_yaml() {
        let settings: AuctionSettings = serde_yaml::from_str("teams: 12\nleague: AL\n").unwrap();
        assert_eq!(settings.teams, 12);
        assert_eq!(settings.league, "AL");
        assert_eq!(settings.dollars, 1000);
        assert_eq!(PlayerType::Batters.file_base(), "fangraphs_batters");
    }
}
