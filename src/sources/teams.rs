// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! MLB team identifiers across sites

/// ESPN `proTeamId`, MLB schedule name, FanGraphs abbreviation
const TEAMS: [(u32, &str, &str); 30] = [
    (1, "Baltimore Orioles", "BAL"),
    (2, "Boston Red Sox", "BOS"),
    (3, "Los Angeles Angels", "LAA"),
    (4, "Chicago White Sox", "CHW"),
    (5, "Cleveland Guardians", "CLE"),
    (6, "Detroit Tigers", "DET"),
    (7, "Kansas City Royals", "KCR"),
    (8, "Milwaukee Brewers", "MIL"),
    (9, "Minnesota Twins", "MIN"),
    (10, "New York Yankees", "NYY"),
    (11, "Oakland Athletics", "OAK"),
    (12, "Seattle Mariners", "SEA"),
    (13, "Texas Rangers", "TEX"),
    (14, "Toronto Blue Jays", "TOR"),
    (15, "Atlanta Braves", "ATL"),
    (16, "Chicago Cubs", "CHC"),
    (17, "Cincinnati Reds", "CIN"),
    (18, "Houston Astros", "HOU"),
    (19, "Los Angeles Dodgers", "LAD"),
    (20, "Washington Nationals", "WSN"),
    (21, "New York Mets", "NYM"),
    (22, "Philadelphia Phillies", "PHI"),
    (23, "Pittsburgh Pirates", "PIT"),
    (24, "St. Louis Cardinals", "STL"),
    (25, "San Diego Padres", "SDP"),
    (26, "San Francisco Giants", "SFG"),
    (27, "Colorado Rockies", "COL"),
    (28, "Miami Marlins", "MIA"),
    (29, "Arizona Diamondbacks", "ARI"),
    (30, "Tampa Bay Rays", "TBR"),
];

/// Team name for an ESPN `proTeamId`
pub fn espn_team_name(id: u32) -> &'static str {
    TEAMS
        .iter()
        .find(|(team_id, _, _)| *team_id == id)
        .map(|(_, name, _)| *name)
        .unwrap_or("Unknown")
}

/// FanGraphs abbreviation for a team name; unknown names pass through
pub fn fangraphs_abbreviation(name: &str) -> &str {
    TEAMS
        .iter()
        .find(|(_, team, _)| *team == name)
        .map(|(_, _, abbr)| *abbr)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(espn_team_name(10), "New York Yankees");
        assert_eq!(espn_team_name(0), "Unknown");
        assert_eq!(fangraphs_abbreviation("Tampa Bay Rays"), "TBR");
        assert_eq!(fangraphs_abbreviation("Athletics"), "Athletics");
    }
}
