//! League profiles for supported basketball competitions.
//!
//! This module provides:
//! - Static league averages the situational adjusters measure against
//! - Default recent-form window per league

/// Team paces further than this factor from the league average are
/// treated as feed errors.
pub const PACE_PLAUSIBILITY_FACTOR: f64 = 3.0;

/// Reference figures for a single league.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueProfile {
    /// League code (e.g., "nba", "ncaab")
    pub league_code: &'static str,
    /// League-average defensive rating (points allowed per 100 possessions)
    pub avg_defensive_rating: f64,
    /// League-average pace (possessions per 48 minutes, per 40 for college)
    pub avg_pace: f64,
    /// League-average share of field goal attempts taken from three
    pub avg_three_point_rate: f64,
    /// Default number of trailing games used for recent form
    pub default_recent_window: usize,
}

impl LeagueProfile {
    pub fn is_plausible_pace(&self, pace: f64) -> bool {
        pace >= self.avg_pace / PACE_PLAUSIBILITY_FACTOR
            && pace <= self.avg_pace * PACE_PLAUSIBILITY_FACTOR
    }
}

/// Static profiles for all supported leagues.
pub static LEAGUE_PROFILES: &[LeagueProfile] = &[
    LeagueProfile {
        league_code: "nba",
        avg_defensive_rating: 114.5,
        avg_pace: 99.0,
        avg_three_point_rate: 0.39,
        default_recent_window: 10,
    },
    LeagueProfile {
        league_code: "wnba",
        avg_defensive_rating: 103.5,
        avg_pace: 80.5,
        avg_three_point_rate: 0.33,
        default_recent_window: 5,
    },
    LeagueProfile {
        league_code: "ncaab",
        avg_defensive_rating: 105.0,
        avg_pace: 68.5,
        avg_three_point_rate: 0.38,
        default_recent_window: 5,
    },
];

/// Get league profile by code.
pub fn get_league_profile(league: &str) -> Option<&'static LeagueProfile> {
    LEAGUE_PROFILES
        .iter()
        .find(|p| p.league_code.eq_ignore_ascii_case(league))
}

/// Get list of all league codes.
pub fn get_all_league_codes() -> Vec<&'static str> {
    LEAGUE_PROFILES.iter().map(|p| p.league_code).collect()
}
