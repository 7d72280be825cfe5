// Shared models for the totals projection engine
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataIssue;
use crate::league_config::LeagueProfile;

// ============================================================================
// Split & Side Enums
// ============================================================================

/// Which subset of games a season row aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Overall,
    Home,
    Away,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Overall => "overall",
            Split::Home => "home",
            Split::Away => "away",
        }
    }
}

/// Which season rows a prediction request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSelector {
    /// Both teams use their overall row.
    #[default]
    Overall,
    /// Home team uses its home row, away team its away row.
    HomeAway,
}

impl SplitSelector {
    /// The row split a team on `side` should be projected from.
    pub fn split_for(&self, side: TeamSide) -> Split {
        match (self, side) {
            (SplitSelector::Overall, _) => Split::Overall,
            (SplitSelector::HomeAway, TeamSide::Home) => Split::Home,
            (SplitSelector::HomeAway, TeamSide::Away) => Split::Away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

// ============================================================================
// Season Statistics
// ============================================================================

/// Aggregate season statistics for one team and one split.
///
/// Shooting figures are per-game averages. Rows are replaced wholesale on
/// each sync, never amended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team_id: String,
    pub season: String,
    pub split: Split,
    #[serde(default)]
    pub games_played: u32,

    pub points_per_game: f64,

    pub two_pt_made: f64,
    pub two_pt_attempted: f64,
    pub three_pt_made: f64,
    pub three_pt_attempted: f64,
    pub free_throws_made: f64,
    pub free_throws_attempted: f64,

    /// Own turnovers per game (not always supplied by the feed)
    #[serde(default)]
    pub turnovers_per_game: Option<f64>,

    /// Points produced per 100 possessions
    pub offensive_rating: f64,
    /// Points allowed per 100 possessions
    pub defensive_rating: f64,
    /// Possessions per 48 minutes
    pub pace: f64,
}

impl TeamSeasonStats {
    /// Check row invariants. Each violation names the offending field.
    pub fn validate(&self) -> Vec<DataIssue> {
        let mut issues = Vec::new();
        let team = self.team_id.as_str();

        for (field, made, attempted) in [
            ("two_pt", self.two_pt_made, self.two_pt_attempted),
            ("three_pt", self.three_pt_made, self.three_pt_attempted),
            ("free_throws", self.free_throws_made, self.free_throws_attempted),
        ] {
            if !made.is_finite() || !attempted.is_finite() || made < 0.0 {
                issues.push(DataIssue::data_quality(
                    team,
                    field,
                    format!("has invalid values ({made} of {attempted})"),
                ));
            } else if attempted < made {
                issues.push(DataIssue::data_quality(
                    team,
                    field,
                    format!("attempts {attempted} below makes {made}"),
                ));
            }
        }

        if !(self.pace.is_finite() && self.pace > 0.0) {
            issues.push(DataIssue::data_quality(
                team,
                "pace",
                format!("must be positive, got {}", self.pace),
            ));
        }

        if self.games_played == 0 {
            issues.push(DataIssue::data_quality(team, "games_played", "no games played"));
        }

        if self.valid_points_per_game().is_none() {
            issues.push(DataIssue::data_quality(
                team,
                "points_per_game",
                format!("must be positive, got {}", self.points_per_game),
            ));
        }

        for (field, value) in [
            ("offensive_rating", self.offensive_rating),
            ("defensive_rating", self.defensive_rating),
        ] {
            if !value.is_finite() {
                issues.push(DataIssue::data_quality(team, field, "is not finite"));
            }
        }

        issues
    }

    /// Season PPG if usable as a scoring baseline.
    pub fn valid_points_per_game(&self) -> Option<f64> {
        let ppg = self.points_per_game;
        (ppg.is_finite() && ppg > 0.0).then_some(ppg)
    }

    /// Pace if usable as a divisor.
    pub fn valid_pace(&self) -> Option<f64> {
        (self.pace.is_finite() && self.pace > 0.0).then_some(self.pace)
    }

    /// Pace if positive and within the league's plausible band.
    pub fn plausible_pace(&self, league: &LeagueProfile) -> Option<f64> {
        self.valid_pace().filter(|pace| league.is_plausible_pace(*pace))
    }

    /// Field goal attempts per game (2PA + 3PA).
    pub fn field_goal_attempts(&self) -> f64 {
        self.two_pt_attempted + self.three_pt_attempted
    }

    /// Share of field goal attempts taken from three, if shooting data is sane.
    pub fn three_point_attempt_rate(&self) -> Option<f64> {
        let shooting_ok = self.two_pt_attempted >= self.two_pt_made
            && self.three_pt_attempted >= self.three_pt_made
            && self.two_pt_made >= 0.0
            && self.three_pt_made >= 0.0;
        let fga = self.field_goal_attempts();
        if !shooting_ok || !fga.is_finite() || fga <= 0.0 {
            return None;
        }
        Some(self.three_pt_attempted / fga)
    }

    /// Own turnovers per 100 possessions.
    pub fn turnover_rate(&self, league: &LeagueProfile) -> Option<f64> {
        let tov = self.turnovers_per_game.filter(|t| t.is_finite() && *t >= 0.0)?;
        let pace = self.plausible_pace(league)?;
        Some(tov / pace * 100.0)
    }
}

// ============================================================================
// Recent Games
// ============================================================================

/// One completed game inside a team's trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGameRecord {
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    pub points: f64,
    #[serde(default)]
    pub offensive_rating: Option<f64>,
    #[serde(default)]
    pub defensive_rating: Option<f64>,
    #[serde(default)]
    pub pace: Option<f64>,
}

impl RecentGameRecord {
    pub fn new(points: f64, offensive_rating: f64, defensive_rating: f64, pace: f64) -> Self {
        Self {
            game_date: None,
            points,
            offensive_rating: Some(offensive_rating),
            defensive_rating: Some(defensive_rating),
            pace: Some(pace),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.game_date = Some(date);
        self
    }
}

/// Means over a team's trailing window. `None` where no game carried the value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecentAverages {
    pub games: usize,
    pub points: Option<f64>,
    pub offensive_rating: Option<f64>,
    pub defensive_rating: Option<f64>,
    pub pace: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl RecentAverages {
    pub fn from_games(games: &[RecentGameRecord]) -> Self {
        Self {
            games: games.len(),
            points: mean(games.iter().map(|g| g.points).filter(|v| v.is_finite())),
            offensive_rating: mean(
                games
                    .iter()
                    .filter_map(|g| g.offensive_rating)
                    .filter(|v| v.is_finite()),
            ),
            defensive_rating: mean(
                games
                    .iter()
                    .filter_map(|g| g.defensive_rating)
                    .filter(|v| v.is_finite()),
            ),
            pace: mean(
                games
                    .iter()
                    .filter_map(|g| g.pace)
                    .filter(|v| v.is_finite() && *v > 0.0),
            ),
        }
    }
}

/// A team's recent games trimmed to the configured window, with any
/// hygiene problems found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentWindow {
    pub games: Vec<RecentGameRecord>,
    pub window: usize,
    pub issues: Vec<DataIssue>,
}

impl RecentWindow {
    pub fn is_short(&self) -> bool {
        self.games.len() < self.window
    }

    pub fn averages(&self) -> RecentAverages {
        RecentAverages::from_games(&self.games)
    }
}

// ============================================================================
// Matchup Input
// ============================================================================

/// Everything the engine knows about one side of a matchup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub season: TeamSeasonStats,
    /// Completed games, most recent first
    #[serde(default)]
    pub recent: Vec<RecentGameRecord>,
}

impl TeamSnapshot {
    pub fn new(season: TeamSeasonStats, recent: Vec<RecentGameRecord>) -> Self {
        Self { season, recent }
    }

    pub fn team_id(&self) -> &str {
        &self.season.team_id
    }

    /// The last `window` games before the prediction date.
    ///
    /// When every game is dated and the sequence is not most-recent-first,
    /// it is re-sorted by date before truncation.
    pub fn recent_window(&self, window: usize) -> RecentWindow {
        let mut games = self.recent.clone();
        let mut issues = Vec::new();

        let all_dated = games.iter().all(|g| g.game_date.is_some());
        let ordered = games
            .windows(2)
            .all(|pair| pair[0].game_date >= pair[1].game_date);
        if all_dated && !ordered {
            games.sort_by(|a, b| b.game_date.cmp(&a.game_date));
            issues.push(DataIssue::data_quality(
                self.team_id(),
                "recent_games",
                "were not most-recent-first; re-sorted by date",
            ));
        }

        games.truncate(window);

        if games.len() < window {
            issues.push(DataIssue::InsufficientHistory {
                team: self.team_id().to_string(),
                available: games.len(),
                window,
            });
        }

        RecentWindow {
            games,
            window,
            issues,
        }
    }
}

/// The case-level unit handed to the engine for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupInput {
    pub home_team: String,
    pub away_team: String,
    pub season: String,
    #[serde(default)]
    pub split: SplitSelector,
    pub home: TeamSnapshot,
    pub away: TeamSnapshot,
    /// Problems found while resolving season rows
    #[serde(skip)]
    pub resolution_issues: Vec<DataIssue>,
}

impl MatchupInput {
    pub fn new(season: &str, split: SplitSelector, home: TeamSnapshot, away: TeamSnapshot) -> Self {
        Self {
            home_team: home.team_id().to_string(),
            away_team: away.team_id().to_string(),
            season: season.to_string(),
            split,
            home,
            away,
            resolution_issues: Vec::new(),
        }
    }

    /// Build an input from each team's full set of season rows.
    ///
    /// Picks the row matching the requested split for each side, falling back
    /// to the overall row when the split row is missing. Returns `None` when a
    /// team has no usable row for the season at all.
    pub fn resolve(
        season: &str,
        split: SplitSelector,
        home_rows: &[TeamSeasonStats],
        home_recent: Vec<RecentGameRecord>,
        away_rows: &[TeamSeasonStats],
        away_recent: Vec<RecentGameRecord>,
    ) -> Option<Self> {
        let mut issues = Vec::new();
        let home = pick_row(home_rows, season, split.split_for(TeamSide::Home), &mut issues)?;
        let away = pick_row(away_rows, season, split.split_for(TeamSide::Away), &mut issues)?;

        let mut input = Self::new(
            season,
            split,
            TeamSnapshot::new(home, home_recent),
            TeamSnapshot::new(away, away_recent),
        );
        input.resolution_issues = issues;
        Some(input)
    }

    pub fn team(&self, side: TeamSide) -> &TeamSnapshot {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

fn pick_row(
    rows: &[TeamSeasonStats],
    season: &str,
    wanted: Split,
    issues: &mut Vec<DataIssue>,
) -> Option<TeamSeasonStats> {
    let in_season = |split: Split| {
        rows.iter()
            .find(|r| r.season == season && r.split == split)
            .cloned()
    };

    if let Some(row) = in_season(wanted) {
        return Some(row);
    }

    let fallback = in_season(Split::Overall)?;
    issues.push(DataIssue::data_quality(
        &fallback.team_id,
        "split",
        format!("no {} row for {season}; using overall", wanted.as_str()),
    ));
    Some(fallback)
}
