// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Remote data sources
//!
//! FanGraphs (auction values, leaderboards, team splits), the MLB
//! schedule API and ESPN fantasy free agents.

mod auction;
mod client;
mod espn;
mod leaders;
mod mlb;
mod teams;

pub use auction::{auction_query, fetch_auction, AuctionSettings, PlayerType, AUCTION_URL};
pub use client::HttpClient;
pub use espn::{
    fetch_free_agents, league_url, parse_free_agents, player_filter, EspnCredentials, FreeAgent,
    ESPN_S2_VAR, ESPN_SWID_VAR,
};
pub use leaders::{
    fetch_pitcher_leaders, fetch_team_splits, pitcher_leaders_query, team_splits_query, Split,
    LEADERS_URL,
};
pub use mlb::{fetch_week, parse_schedule, schedule_query, Matchup, SCHEDULE_URL, TBD};
pub use teams::{espn_team_name, fangraphs_abbreviation};
