//! Situational adjusters
//!
//! Three independent stages, run in this order after the baseline:
//! - Turnover differential: the side that protects the ball better earns
//!   extra possessions
//! - Opponent defensive tier: scoring is nudged by how far the opposing
//!   defense sits from league average
//! - Shootout potential: two high-volume three-point teams push both scores
//!   up and make the outcome less predictable
//!
//! Each reads only season stats, league averages and its own step table.

use super::{AdjustmentStage, AdjustmentStageResult, MatchupState, StageContext};
use crate::error::DataIssue;
use crate::models::TeamSide;

// ============================================================================
// Turnover Differential
// ============================================================================

pub struct TurnoverAdjuster;

impl AdjustmentStage for TurnoverAdjuster {
    fn name(&self) -> &'static str {
        "turnover_differential"
    }

    fn evaluate(&self, ctx: &StageContext<'_>, _state: &MatchupState) -> AdjustmentStageResult {
        let home = &ctx.input.home;
        let away = &ctx.input.away;

        let (Some(home_rate), Some(away_rate)) =
            (
            home.season.turnover_rate(ctx.league),
            away.season.turnover_rate(ctx.league),
        )
        else {
            let mut result = AdjustmentStageResult::new(self.name(), "turnover data unavailable");
            for team in [home, away] {
                if team.season.turnover_rate(ctx.league).is_none() {
                    result.issues.push(DataIssue::data_quality(
                        team.team_id(),
                        "turnovers_per_game",
                        "missing or unusable",
                    ));
                }
            }
            return result;
        };

        // Positive: home gives the ball away less often than away does
        let home_edge = away_rate - home_rate;
        let points = ctx.config.turnover_points.lookup(home_edge);

        let summary = format!(
            "turnovers per 100: {} {:.1}, {} {:.1} (edge {:+.1})",
            home.team_id(),
            home_rate,
            away.team_id(),
            away_rate,
            home_edge,
        );

        if points == 0.0 {
            return AdjustmentStageResult::new(self.name(), format!("{summary}; below threshold"));
        }

        let favored = if home_edge > 0.0 {
            TeamSide::Home
        } else {
            TeamSide::Away
        };
        let mut result = AdjustmentStageResult::new(
            self.name(),
            format!(
                "{summary}; {} +{:.1}",
                ctx.input.team(favored).team_id(),
                points
            ),
        );
        result.set_delta(favored, points);
        result.confidence_delta = ctx.config.turnover_confidence;
        result
    }
}

// ============================================================================
// Opponent Defensive Tier
// ============================================================================

pub struct DefensiveTierAdjuster;

impl AdjustmentStage for DefensiveTierAdjuster {
    fn name(&self) -> &'static str {
        "defensive_tier"
    }

    fn evaluate(&self, ctx: &StageContext<'_>, _state: &MatchupState) -> AdjustmentStageResult {
        let league_drtg = ctx.league.avg_defensive_rating;
        let mut result = AdjustmentStageResult::new(self.name(), "");
        let mut notes = Vec::with_capacity(2);

        for side in [TeamSide::Home, TeamSide::Away] {
            let team = ctx.input.team(side);
            let opponent = ctx.input.team(side.opponent());
            let opp_drtg = opponent.season.defensive_rating;

            if !opp_drtg.is_finite() {
                result.issues.push(DataIssue::data_quality(
                    opponent.team_id(),
                    "defensive_rating",
                    "is not finite",
                ));
                notes.push(format!("{} vs unknown defense", team.team_id()));
                continue;
            }

            // Soft defense (high DRTG) raises scoring, elite defense lowers it
            let gap = opp_drtg - league_drtg;
            let magnitude = ctx.config.defensive_tier_points.lookup(gap);
            let delta = if gap >= 0.0 { magnitude } else { -magnitude };
            result.set_delta(side, delta);
            notes.push(format!(
                "{} vs DRTG {:.1} ({:+.1} to league) {:+.1}",
                team.team_id(),
                opp_drtg,
                gap,
                delta
            ));
        }

        result.rationale = notes.join("; ");
        result
    }
}

// ============================================================================
// Shootout Potential
// ============================================================================

pub struct ShootoutAdjuster;

impl AdjustmentStage for ShootoutAdjuster {
    fn name(&self) -> &'static str {
        "shootout_potential"
    }

    fn evaluate(&self, ctx: &StageContext<'_>, _state: &MatchupState) -> AdjustmentStageResult {
        let home = &ctx.input.home;
        let away = &ctx.input.away;

        let (Some(home_rate), Some(away_rate)) = (
            home.season.three_point_attempt_rate(),
            away.season.three_point_attempt_rate(),
        ) else {
            let mut result =
                AdjustmentStageResult::new(self.name(), "shooting data unavailable");
            for team in [home, away] {
                if team.season.three_point_attempt_rate().is_none() {
                    result.issues.push(DataIssue::data_quality(
                        team.team_id(),
                        "three_pt_attempted",
                        "shooting splits unusable",
                    ));
                }
            }
            return result;
        };

        let combined = (home_rate + away_rate) / 2.0;
        let excess = combined - ctx.league.avg_three_point_rate;
        let summary = format!(
            "combined 3PA rate {:.3} ({:+.3} to league)",
            combined, excess
        );

        // Only volume above league average signals a shootout
        if excess <= 0.0 {
            return AdjustmentStageResult::new(self.name(), summary);
        }

        let points = ctx.config.shootout_points.lookup(excess);
        let confidence = ctx.config.shootout_confidence.lookup_confidence(excess);
        let mut result = AdjustmentStageResult::new(
            self.name(),
            format!("{summary}; each {:+.1}, confidence {:+}", points, confidence),
        );
        result.home_delta = points;
        result.away_delta = points;
        result.confidence_delta = confidence;
        result
    }
}
