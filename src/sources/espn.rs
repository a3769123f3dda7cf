// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! ESPN fantasy free agents

use std::collections::HashMap;

use serde_json::{json, Value};

use super::client::HttpClient;
use super::teams::espn_team_name;
use crate::config::EspnConfig;
use crate::errors::ScrapeflowError;

const ESPN_BASE: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/flb/seasons";

/// ESPN's lineup slot id for starting pitchers
const STARTING_PITCHER_SLOT: u32 = 13;

pub const ESPN_S2_VAR: &str = "ESPN_S2";
pub const ESPN_SWID_VAR: &str = "ESPN_SWID";

/// An available player and the team they play for
#[derive(Debug, Clone, PartialEq)]
pub struct FreeAgent {
    pub name: String,
    pub team: String,
}

/// League session cookies
#[derive(Debug, Clone)]
pub struct EspnCredentials {
    pub espn_s2: String,
    pub swid: String,
}

impl EspnCredentials {
    /// Read the cookies from a step environment
    pub fn from_env(env: &HashMap<String, String>) -> Result<Self, ScrapeflowError> {
        let get = |var: &str| {
            env.get(var)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ScrapeflowError::missing_espn_cookie(var))
        };

        Ok(Self {
            espn_s2: get(ESPN_S2_VAR)?,
            swid: get(ESPN_SWID_VAR)?,
        })
    }

    pub fn cookie_header(&self) -> String {
        format!("espn_s2={}; SWID={}", self.espn_s2, self.swid)
    }
}

pub fn league_url(config: &EspnConfig) -> String {
    format!("{}/{}/segments/0/leagues/{}", ESPN_BASE, config.season, config.league_id)
}

/// The `X-Fantasy-Filter` header selecting free agents and waivers
pub fn player_filter(config: &EspnConfig) -> Value {
    let mut players = json!({
        "filterStatus": {"value": ["FREEAGENT", "WAIVERS"]},
        "filterSlotIds": {"value": [STARTING_PITCHER_SLOT]},
        "limit": config.player_limit,
        "sortPercOwned": {"sortAsc": false, "sortPriority": 1},
        "sortDraftRanks": {"sortPriority": 2, "sortAsc": true, "value": "STANDARD"}
    });

    if let (Some(period), Some(map)) = (config.scoring_period, players.as_object_mut()) {
        map.insert(
            "filterRanksForScoringPeriodIds".to_string(),
            json!({"value": [period]}),
        );
    }

    json!({ "players": players })
}

/// Free-agent and waiver starting pitchers
pub async fn fetch_free_agents(
    client: &HttpClient,
    config: &EspnConfig,
    credentials: &EspnCredentials,
) -> Result<Vec<FreeAgent>, ScrapeflowError> {
    let mut query = vec![("view", "kona_player_info".to_string())];
    if let Some(period) = config.scoring_period {
        query.insert(0, ("scoringPeriodId", period.to_string()));
    }

    let headers = [
        ("accept", "application/json".to_string()),
        ("x-fantasy-source", "kona".to_string()),
        ("x-fantasy-filter", player_filter(config).to_string()),
        ("cookie", credentials.cookie_header()),
    ];

    let body = client.get_json(&league_url(config), &query, &headers).await?;
    Ok(parse_free_agents(&body))
}

/// Players with both a team id and a name
pub fn parse_free_agents(body: &Value) -> Vec<FreeAgent> {
    body.get("players")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let player = entry.get("player")?;
            let team_id = player.get("proTeamId").and_then(Value::as_u64).filter(|id| *id > 0)?;
            let name = player.get("fullName").and_then(Value::as_str).filter(|n| !n.is_empty())?;

            Some(FreeAgent {
                name: name.to_string(),
                team: espn_team_name(team_id as u32).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_free_agents() {
        let body = json!({
            "players": [
                {"player": {"fullName": "Bowden Francis", "proTeamId": 14}},
                {"player": {"fullName": "No Team", "proTeamId": 0}},
                {"player": {"proTeamId": 3}},
                {"id": 7}
            ]
        });

        let agents = parse_free_agents(&body);
        assert_eq!(
            agents,
            vec![FreeAgent {
                name: "Bowden Francis".into(),
                team: "Toronto Blue Jays".into()
            }]
        );
    }

    #[test]
    fn test_filter_and_url() {
        let mut config = EspnConfig::default();
        assert_eq!(
            league_url(&config),
            "https://lm-api-reads.fantasy.espn.com/apis/v3/games/flb/seasons/2025/segments/0/leagues/27130"
        );

        let filter = player_filter(&config);
        assert_eq!(filter["players"]["filterSlotIds"]["value"][0], 13);
        assert_eq!(filter["players"]["limit"], 500);
        assert!(filter["players"].get("filterRanksForScoringPeriodIds").is_none());

        config.scoring_period = Some(157);
        let filter = player_filter(&config);
        assert_eq!(filter["players"]["filterRanksForScoringPeriodIds"]["value"][0], 157);
    }

    #[test]
    fn test_credentials_required() {
        let mut env = HashMap::new();
        env.insert(ESPN_S2_VAR.to_string(), "s2".to_string());
        assert!(matches!(
            EspnCredentials::from_env(&env),
            Err(ScrapeflowError::MissingCredential { .. })
        ));

        env.insert(ESPN_SWID_VAR.to_string(), "{ABC}".to_string());
        let creds = EspnCredentials::from_env(&env).unwrap();
        assert_eq!(creds.cookie_header(), "espn_s2=s2; SWID={ABC}");
    }
}
