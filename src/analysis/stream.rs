// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Streaming pitcher recommendations
//!
//! A probable starter is worth streaming when they are on the waiver wire
//! and face a lineup that is weak or strikes out a lot against their hand.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;

use crate::data::{read_rows, Record, Row};
use crate::errors::ScrapeflowError;
use crate::sources::{fangraphs_abbreviation, FreeAgent, Matchup, TBD};

/// Opponent batting against one pitcher hand
///
/// An opponent without a split row counts as all zeros, which makes it a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitStats {
    pub wrc_plus: f64,
    /// Strikeout rate in percent (22.5, not 0.225)
    pub k_percent: f64,
}

/// Split stats keyed by FanGraphs team abbreviation
pub type TeamSplits = HashMap<String, SplitStats>;

/// Throwing hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
    Unknown,
}

impl Hand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
            Self::Unknown => "Unknown",
        }
    }
}

/// What makes an opponent a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamCriteria {
    /// Below this wRC+ the opponent is a target
    pub max_wrc_plus: f64,
    /// Above this K% the opponent is a target
    pub min_k_percent: f64,
}

impl Default for StreamCriteria {
    fn default() -> Self {
        Self {
            max_wrc_plus: 100.0,
            min_k_percent: 22.0,
        }
    }
}

impl StreamCriteria {
    pub fn is_target(&self, stats: &SplitStats) -> bool {
        stats.wrc_plus < self.max_wrc_plus || stats.k_percent > self.min_k_percent
    }
}

const TEAM_KEYS: [&str; 3] = ["Tm", "TeamNameAbb", "TeamName"];

fn clean(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// Parse a K% cell: `22.1`, `"22.1%"` or a fraction like `0.221`
fn parse_percent(raw: &str) -> Option<f64> {
    let text = clean(raw);
    let explicit = text.ends_with('%');
    let value: f64 = text.trim_end_matches('%').trim().parse().ok()?;
    Some(if !explicit && value < 1.0 { value * 100.0 } else { value })
}

/// Split stats from CSV rows with `Tm`, `wRC+` and `K%` columns
pub fn team_splits_from_rows(rows: &[Row], source: &str) -> TeamSplits {
    let mut splits = TeamSplits::new();

    for row in rows {
        let team = TEAM_KEYS.iter().find_map(|k| row.get(*k)).map(|t| clean(t));
        let wrc_plus = row.get("wRC+").and_then(|v| clean(v).parse::<f64>().ok());
        let k_percent = row.get("K%").and_then(|v| parse_percent(v));

        match (team, wrc_plus, k_percent) {
            (Some(team), Some(wrc_plus), Some(k_percent)) if !team.is_empty() => {
                splits.insert(team.to_string(), SplitStats { wrc_plus, k_percent });
            }
            _ => tracing::warn!("Skipping unreadable row in {}: {:?}", source, row),
        }
    }

    splits
}

/// Split stats from leaderboard API records
pub fn team_splits_from_records(records: &[Record]) -> TeamSplits {
    let number = |record: &Record, key: &str| match record.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => clean(s).parse().ok(),
        _ => None,
    };

    records
        .iter()
        .filter_map(|record| {
            let team = TEAM_KEYS
                .iter()
                .find_map(|k| record.get(*k).and_then(Value::as_str))
                .filter(|t| !t.is_empty())?;
            let wrc_plus = number(record, "wRC+")?;
            let k_percent = match record.get("K%")? {
                Value::String(s) => parse_percent(s)?,
                other => {
                    let k = other.as_f64()?;
                    if k < 1.0 { k * 100.0 } else { k }
                }
            };
            Some((team.to_string(), SplitStats { wrc_plus, k_percent }))
        })
        .collect()
}

/// Load split stats from a CSV file
pub fn load_team_splits(path: &Path) -> Result<TeamSplits, ScrapeflowError> {
    let rows = read_rows(path)?;
    Ok(team_splits_from_rows(&rows, &path.display().to_string()))
}

/// Load a pitcher list whose first column is the name
///
/// Rows with fewer than two columns are ignored.
pub fn load_handedness(path: &Path, hand: Hand) -> Result<HashMap<String, Hand>, ScrapeflowError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut handedness = HashMap::new();

    for record in reader.records() {
        let record = record?;
        if record.len() >= 2 {
            handedness.insert(clean(&record[0]).to_string(), hand);
        }
    }

    Ok(handedness)
}

/// Everything the recommender looks at
#[derive(Debug, Clone, Copy)]
pub struct StreamInputs<'a> {
    pub matchups: &'a [Matchup],
    pub free_agents: &'a [FreeAgent],
    pub vs_lhp: &'a TeamSplits,
    pub vs_rhp: &'a TeamSplits,
    pub handedness: &'a HashMap<String, Hand>,
    pub criteria: StreamCriteria,
}

/// A recommended start
#[derive(Debug, Clone, PartialEq)]
pub struct StreamOption {
    pub pitcher: String,
    pub team: String,
    pub hand: Hand,
    pub opponent: String,
    pub stats: SplitStats,
}

/// A game with at least one recommended starter
#[derive(Debug, Clone, PartialEq)]
pub struct GameOptions {
    pub matchup: Matchup,
    pub options: Vec<StreamOption>,
}

/// Recommended games for one day
#[derive(Debug, Clone, PartialEq)]
pub struct DayOptions {
    pub date: NaiveDate,
    pub games: Vec<GameOptions>,
}

/// Whether a probable starter matches an available player
///
/// Names match when either lowercase name contains the other.
pub fn is_available(pitcher: &str, available: &[String]) -> bool {
    if pitcher == TBD {
        return false;
    }
    let pitcher = pitcher.to_lowercase();
    available
        .iter()
        .any(|name| !name.is_empty() && (name.contains(&pitcher) || pitcher.contains(name.as_str())))
}

/// Recommended starts grouped by day, in schedule order
pub fn recommend(inputs: &StreamInputs<'_>) -> Vec<DayOptions> {
    let available: Vec<String> = inputs
        .free_agents
        .iter()
        .map(|a| a.name.to_lowercase())
        .collect();

    let mut days: Vec<DayOptions> = Vec::new();

    for matchup in inputs.matchups {
        let sides = [
            (&matchup.away_pitcher, &matchup.away_team, &matchup.home_team),
            (&matchup.home_pitcher, &matchup.home_team, &matchup.away_team),
        ];

        let options: Vec<StreamOption> = sides
            .into_iter()
            .filter(|(pitcher, _, _)| is_available(pitcher, &available))
            .filter_map(|(pitcher, team, opponent)| {
                let hand = inputs.handedness.get(pitcher.as_str()).copied().unwrap_or(Hand::Unknown);
                let splits = if hand == Hand::Right { inputs.vs_rhp } else { inputs.vs_lhp };

                let stats = splits
                    .get(fangraphs_abbreviation(opponent))
                    .copied()
                    .unwrap_or_else(|| {
                        tracing::warn!("No split stats for {}; scoring them as 0 wRC+, 0 K%", opponent);
                        SplitStats::default()
                    });

                inputs.criteria.is_target(&stats).then(|| StreamOption {
                    pitcher: pitcher.clone(),
                    team: team.clone(),
                    hand,
                    opponent: opponent.clone(),
                    stats,
                })
            })
            .collect();

        if options.is_empty() {
            continue;
        }

        let game = GameOptions {
            matchup: matchup.clone(),
            options,
        };

        match days.iter_mut().find(|d| d.date == matchup.date) {
            Some(day) => day.games.push(game),
            None => days.push(DayOptions {
                date: matchup.date,
                games: vec![game],
            }),
        }
    }

    days
}

/// Render the weekly text report
pub fn render_report(start: NaiveDate, days: &[DayOptions]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Potential streaming options for the week starting {}:\n",
        start.format("%Y-%m-%d")
    );

    for day in days {
        let _ = writeln!(out, "{}:", day.date.format("%A"));

        for game in &day.games {
            let m = &game.matchup;
            let _ = writeln!(
                out,
                "  {} ({}) @ {} ({})",
                m.away_team, m.away_pitcher, m.home_team, m.home_pitcher
            );

            for option in &game.options {
                let hand = option.hand.label();
                let _ = writeln!(
                    out,
                    "    Potential streaming option: {} ({}, {})",
                    option.pitcher, option.team, hand
                );
                let _ = writeln!(out, "      Opponent: {}", option.opponent);
                let _ = writeln!(
                    out,
                    "      Opponent stats vs {}HP: wRC+: {:.2}, K%: {:.2}%",
                    hand, option.stats.wrc_plus, option.stats.k_percent
                );
            }
        }

        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn matchup(day: u32, away: (&str, &str), home: (&str, &str)) -> Matchup {
        Matchup {
            date: date(day),
            away_team: away.0.into(),
            away_pitcher: away.1.into(),
            home_team: home.0.into(),
            home_pitcher: home.1.into(),
        }
    }

    fn splits(entries: &[(&str, f64, f64)]) -> TeamSplits {
        entries
            .iter()
            .map(|(t, w, k)| (t.to_string(), SplitStats { wrc_plus: *w, k_percent: *k }))
            .collect()
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("22.5"), Some(22.5));
        assert_eq!(parse_percent("\"24.1%\""), Some(24.1));
        assert_eq!(parse_percent("0.25"), Some(25.0));
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn test_is_available_substring_match() {
        let available = vec!["bowden francis".to_string(), "".to_string()];
        assert!(is_available("Bowden Francis", &available));
        assert!(is_available("Francis", &available));
        assert!(!is_available("Max Fried", &available));
        assert!(!is_available(TBD, &available));
    }

    #[test]
    fn test_team_splits_from_rows_and_records() {
        let mut row = Row::new();
        row.insert("Tm".into(), "\"NYY\"".into());
        row.insert("wRC+".into(), "112".into());
        row.insert("K%".into(), "21.4%".into());
        let mut bad = Row::new();
        bad.insert("Tm".into(), "BOS".into());
        bad.insert("wRC+".into(), "oops".into());

        let from_rows = team_splits_from_rows(&[row, bad], "test.csv");
        assert_eq!(from_rows.len(), 1);
        assert_eq!(from_rows["NYY"], SplitStats { wrc_plus: 112.0, k_percent: 21.4 });

        let records: Vec<Record> = vec![json!({"TeamNameAbb": "TBR", "wRC+": 94.0, "K%": 0.245})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        let from_records = team_splits_from_records(&records);
        assert_eq!(from_records["TBR"].wrc_plus, 94.0);
        assert!((from_records["TBR"].k_percent - 24.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_handedness_skips_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left_handed_pitchers.csv");
        std::fs::write(&path, "Name,Team\n\"Max Fried\",NYY\nLonely\n").unwrap();

        let hands = load_handedness(&path, Hand::Left).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands["Max Fried"], Hand::Left);
    }

    #[test]
    fn test_recommend_and_render() {
        let matchups = vec![
            matchup(1, ("Toronto Blue Jays", "Bowden Francis"), ("Tampa Bay Rays", "Shane Baz")),
            matchup(1, ("New York Yankees", "Max Fried"), ("Boston Red Sox", TBD)),
            matchup(2, ("Colorado Rockies", "Kyle Freeland"), ("Los Angeles Dodgers", "Landon Knack")),
        ];
        let free_agents = vec![
            FreeAgent { name: "Bowden Francis".into(), team: "Toronto Blue Jays".into() },
            FreeAgent { name: "Landon Knack".into(), team: "Los Angeles Dodgers".into() },
            FreeAgent { name: "Max Fried".into(), team: "New York Yankees".into() },
        ];
        let vs_rhp = splits(&[("TBR", 94.5, 21.0), ("BOS", 120.0, 18.0), ("COL", 88.0, 26.3)]);
        let vs_lhp = splits(&[("TBR", 105.0, 20.0), ("BOS", 101.0, 21.0)]);
        let mut handedness = HashMap::new();
        handedness.insert("Bowden Francis".to_string(), Hand::Right);
        handedness.insert("Max Fried".to_string(), Hand::Left);
        handedness.insert("Landon Knack".to_string(), Hand::Right);

        let days = recommend(&StreamInputs {
            matchups: &matchups,
            free_agents: &free_agents,
            vs_lhp: &vs_lhp,
            vs_rhp: &vs_rhp,
            handedness: &handedness,
            criteria: StreamCriteria::default(),
        });

        // Fried faces BOS (101 wRC+, 21% K) vs LHP: not a target
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].games.len(), 1);
        assert_eq!(days[0].games[0].options[0].opponent, "Tampa Bay Rays");

        let report = render_report(date(1), &days);
        insta::assert_snapshot!(report, @r###"
Potential streaming options for the week starting 2025-05-01:

Thursday:
  Toronto Blue Jays (Bowden Francis) @ Tampa Bay Rays (Shane Baz)
    Potential streaming option: Bowden Francis (Toronto Blue Jays, R)
      Opponent: Tampa Bay Rays
      Opponent stats vs RHP: wRC+: 94.50, K%: 21.00%

Friday:
  Colorado Rockies (Kyle Freeland) @ Los Angeles Dodgers (Landon Knack)
    Potential streaming option: Landon Knack (Los Angeles Dodgers, R)
      Opponent: Colorado Rockies
      Opponent stats vs RHP: wRC+: 88.00, K%: 26.30%
"###);
    }

    #[test]
    fn test_missing_opponent_stats_count_as_zero() {
        let matchups = vec![matchup(3, ("Athletics", "JP Sears"), ("Seattle Mariners", "Logan Gilbert"))];
        let free_agents = vec![FreeAgent { name: "Logan Gilbert".into(), team: "Seattle Mariners".into() }];
        let empty = TeamSplits::new();
        let handedness = HashMap::new();

        let days = recommend(&StreamInputs {
            matchups: &matchups,
            free_agents: &free_agents,
            vs_lhp: &empty,
            vs_rhp: &empty,
            handedness: &handedness,
            criteria: StreamCriteria::default(),
        });

        assert_eq!(days.len(), 1);
        let option = &days[0].games[0].options[0];
        assert_eq!(option.pitcher, "Logan Gilbert");
        assert_eq!(option.hand, Hand::Unknown);
        assert_eq!(option.stats, SplitStats { wrc_plus: 0.0, k_percent: 0.0 });
    }

    #[test]
    fn test_every_game_gets_its_own_header() {
        let matchups = vec![
            matchup(3, ("Athletics", "JP Sears"), ("Seattle Mariners", "Logan Gilbert")),
            matchup(3, ("Miami Marlins", "Cal Quantrill"), ("Atlanta Braves", "Spencer Schwellenbach")),
        ];
        let free_agents = vec![
            FreeAgent { name: "JP Sears".into(), team: "Athletics".into() },
            FreeAgent { name: "Spencer Schwellenbach".into(), team: "Atlanta Braves".into() },
        ];
        let vs_lhp = splits(&[("SEA", 92.0, 24.0)]);
        let vs_rhp = splits(&[("MIA", 85.0, 23.5)]);
        let mut handedness = HashMap::new();
        handedness.insert("JP Sears".to_string(), Hand::Left);
        handedness.insert("Spencer Schwellenbach".to_string(), Hand::Right);

        let days = recommend(&StreamInputs {
            matchups: &matchups,
            free_agents: &free_agents,
            vs_lhp: &vs_lhp,
            vs_rhp: &vs_rhp,
            handedness: &handedness,
            criteria: StreamCriteria::default(),
        });
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].games.len(), 2);

        let report = render_report(date(3), &days);
        assert_eq!(report.matches("Saturday:").count(), 1);
        assert!(report.contains("  Athletics (JP Sears) @ Seattle Mariners (Logan Gilbert)\n"));
        assert!(report.contains("  Miami Marlins (Cal Quantrill) @ Atlanta Braves (Spencer Schwellenbach)\n"));
    }
}
