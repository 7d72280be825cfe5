//! Baseline projection
//!
//! Each team starts from its season scoring rate scaled to the tempo the
//! matchup is expected to play at:
//!
//! `projected = season_ppg × matchup_pace / team_pace`
//!
//! Pace-driven score impact lives here and nowhere else in the pipeline.
//! A pace that is non-positive or far outside the league's range drops both
//! teams to unscaled PPG.

use super::{AdjustmentStage, AdjustmentStageResult, MatchupState, StageContext};
use crate::error::DataIssue;
use crate::models::{RecentAverages, TeamSide};

pub struct BaselineProjector;

impl BaselineProjector {
    /// Season PPG, or the recent scoring mean when the season figure is unusable.
    fn scoring_rate(
        ctx: &StageContext<'_>,
        side: TeamSide,
        issues: &mut Vec<DataIssue>,
    ) -> f64 {
        let team = ctx.input.team(side);
        if let Some(ppg) = team.season.valid_points_per_game() {
            return ppg;
        }
        let ppg = team.season.points_per_game;

        let recent = RecentAverages::from_games(&team.recent_window(ctx.config.recent_window).games);
        let fallback = recent.points.unwrap_or(0.0);
        issues.push(DataIssue::data_quality(
            team.team_id(),
            "points_per_game",
            format!("unusable ({ppg}); using recent mean {fallback:.1}"),
        ));
        fallback
    }
}

impl AdjustmentStage for BaselineProjector {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn evaluate(&self, ctx: &StageContext<'_>, _state: &MatchupState) -> AdjustmentStageResult {
        let mut issues = Vec::new();
        let home = &ctx.input.home;
        let away = &ctx.input.away;

        let home_ppg = Self::scoring_rate(ctx, TeamSide::Home, &mut issues);
        let away_ppg = Self::scoring_rate(ctx, TeamSide::Away, &mut issues);

        let (home_score, away_score, rationale) =
            match (
                home.season.plausible_pace(ctx.league),
                away.season.plausible_pace(ctx.league),
            ) {
                (Some(home_pace), Some(away_pace)) => {
                    let policy = ctx.config.pace_policy;
                    let matchup_pace = policy.combine(home_pace, away_pace);
                    let home_score = home_ppg * matchup_pace / home_pace;
                    let away_score = away_ppg * matchup_pace / away_pace;
                    let rationale = format!(
                        "matchup pace {:.1} ({} of {:.1} / {:.1}): {} {:.1} -> {:.1}, {} {:.1} -> {:.1}",
                        matchup_pace,
                        policy.as_str(),
                        home_pace,
                        away_pace,
                        home.team_id(),
                        home_ppg,
                        home_score,
                        away.team_id(),
                        away_ppg,
                        away_score,
                    );
                    (home_score, away_score, rationale)
                }
                (home_pace, away_pace) => {
                    for (team, pace) in [(home, home_pace), (away, away_pace)] {
                        if pace.is_none() {
                            issues.push(DataIssue::data_quality(
                                team.team_id(),
                                "pace",
                                format!(
                                    "must be positive and near league average {:.1}, got {}",
                                    ctx.league.avg_pace, team.season.pace
                                ),
                            ));
                        }
                    }
                    let rationale = format!(
                        "pace unavailable, unscaled season PPG: {} {:.1}, {} {:.1}",
                        home.team_id(),
                        home_ppg,
                        away.team_id(),
                        away_ppg,
                    );
                    (home_ppg, away_ppg, rationale)
                }
            };

        let mut result = AdjustmentStageResult::new(self.name(), rationale);
        result.home_delta = home_score;
        result.away_delta = away_score;
        result.issues = issues;
        result
    }
}
