// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! MLB schedule with probable pitchers

use chrono::NaiveDate;
use serde_json::Value;

use super::client::HttpClient;
use crate::errors::ScrapeflowError;

pub const SCHEDULE_URL: &str = "https://statsapi.mlb.com/api/v1/schedule";

/// Placeholder for an unannounced starter
pub const TBD: &str = "TBD";

/// One scheduled game
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub date: NaiveDate,
    pub away_team: String,
    pub home_team: String,
    pub away_pitcher: String,
    pub home_pitcher: String,
}

pub fn schedule_query(date: NaiveDate) -> Vec<(&'static str, String)> {
    vec![
        ("sportId", "1".to_string()),
        ("date", date.format("%Y-%m-%d").to_string()),
        ("leagueId", "103,104".to_string()),
        ("hydrate", "team,linescore,flags,liveLookin,review,probablePitcher".to_string()),
        ("useLatestGames", "false".to_string()),
        ("language", "en".to_string()),
    ]
}

/// Games of `days` consecutive days, one request per day
pub async fn fetch_week(
    client: &HttpClient,
    start: NaiveDate,
    days: u32,
) -> Result<Vec<Matchup>, ScrapeflowError> {
    let mut matchups = Vec::new();

    for date in start.iter_days().take(days as usize) {
        let body = client.get_json(SCHEDULE_URL, &schedule_query(date), &[]).await?;
        let games = parse_schedule(&body)?;
        tracing::debug!("{}: {} games", date, games.len());
        matchups.extend(games);
    }

    Ok(matchups)
}

/// Extract matchups from a schedule response
pub fn parse_schedule(body: &Value) -> Result<Vec<Matchup>, ScrapeflowError> {
    let unexpected = |reason: String| ScrapeflowError::UnexpectedResponse {
        source_name: "MLB schedule".to_string(),
        reason,
    };

    let mut matchups = Vec::new();
    for day in body.get("dates").and_then(Value::as_array).into_iter().flatten() {
        let date_str = day
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| unexpected("schedule day without a date".to_string()))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| unexpected(format!("bad date '{}': {}", date_str, e)))?;

        for game in day.get("games").and_then(Value::as_array).into_iter().flatten() {
            let side = |which: &str| game.get("teams").and_then(|t| t.get(which));
            let team = |which: &str| {
                side(which)
                    .and_then(|s| s.pointer("/team/name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| unexpected(format!("game on {} without {} team", date, which)))
            };
            let pitcher = |which: &str| {
                side(which)
                    .and_then(|s| s.pointer("/probablePitcher/fullName"))
                    .and_then(Value::as_str)
                    .unwrap_or(TBD)
                    .to_string()
            };

            matchups.push(Matchup {
                date,
                away_team: team("away")?,
                home_team: team("home")?,
                away_pitcher: pitcher("away"),
                home_pitcher: pitcher("home"),
            });
        }
    }

    Ok(matchups)
}
