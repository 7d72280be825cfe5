//! Projection pipeline abstractions
//!
//! Defines the AdjustmentStage trait every step of the projection conforms
//! to. A stage reads the matchup and the running state and reports what it
//! contributes; the engine folds that contribution into the state and keeps
//! the report for the breakdown.
//!
//! Stage order is fixed:
//! baseline -> turnover differential -> defensive tier -> shootout -> recent form
//!
//! The order fixes the breakdown layout. Current stages read only the
//! matchup inputs, never the running state, so their deltas do not depend
//! on one another.

use serde::{Serialize, Serializer};

use crate::config::PredictionConfig;
use crate::error::DataIssue;
use crate::league_config::LeagueProfile;
use crate::models::{MatchupInput, TeamSide};
use crate::utils::points::round_to_hundredths;

pub mod aggregator;
pub mod baseline;
pub mod recent_form;
pub mod situational;

pub use aggregator::{aggregate, PredictionResult};
pub use baseline::BaselineProjector;
pub use recent_form::RecentFormAdjuster;
pub use situational::{DefensiveTierAdjuster, ShootoutAdjuster, TurnoverAdjuster};

/// Read-only inputs shared by every stage of one prediction.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub input: &'a MatchupInput,
    pub config: &'a PredictionConfig,
    pub league: &'static LeagueProfile,
}

/// Running accumulators threaded through the pipeline.
///
/// Confidence is left unclamped here; bounds apply once, in the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchupState {
    pub home_score: f64,
    pub away_score: f64,
    pub confidence: i32,
}

impl MatchupState {
    pub fn new(base_confidence: i32) -> Self {
        Self {
            home_score: 0.0,
            away_score: 0.0,
            confidence: base_confidence,
        }
    }

    pub fn score(&self, side: TeamSide) -> f64 {
        match side {
            TeamSide::Home => self.home_score,
            TeamSide::Away => self.away_score,
        }
    }

    /// Fold one stage's contribution into the accumulators.
    pub fn apply(self, result: &AdjustmentStageResult) -> Self {
        Self {
            home_score: self.home_score + result.home_delta,
            away_score: self.away_score + result.away_delta,
            confidence: self.confidence + result.confidence_delta,
        }
    }
}

fn hundredths<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to_hundredths(*value))
}

/// What one stage contributed. Never mutated once the stage returns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentStageResult {
    pub stage: &'static str,
    #[serde(serialize_with = "hundredths")]
    pub home_delta: f64,
    #[serde(serialize_with = "hundredths")]
    pub away_delta: f64,
    pub confidence_delta: i32,
    pub rationale: String,
    /// Degradations met while computing this stage
    #[serde(skip)]
    pub issues: Vec<DataIssue>,
}

impl AdjustmentStageResult {
    pub fn new(stage: &'static str, rationale: impl Into<String>) -> Self {
        Self {
            stage,
            home_delta: 0.0,
            away_delta: 0.0,
            confidence_delta: 0,
            rationale: rationale.into(),
            issues: Vec::new(),
        }
    }

    pub fn delta(&self, side: TeamSide) -> f64 {
        match side {
            TeamSide::Home => self.home_delta,
            TeamSide::Away => self.away_delta,
        }
    }

    pub fn set_delta(&mut self, side: TeamSide, delta: f64) {
        match side {
            TeamSide::Home => self.home_delta = delta,
            TeamSide::Away => self.away_delta = delta,
        }
    }

    /// True when the stage moved neither score nor confidence.
    pub fn is_neutral(&self) -> bool {
        self.home_delta == 0.0 && self.away_delta == 0.0 && self.confidence_delta == 0
    }
}

/// One ordered unit of the projection pipeline.
///
/// Implementations must be pure: the same context and state always yield
/// the same result, and a stage sees other stages only through the shared
/// accumulators.
pub trait AdjustmentStage: Send + Sync {
    /// Stage name as reported in the breakdown
    fn name(&self) -> &'static str;

    /// Compute this stage's contribution without applying it.
    fn evaluate(&self, ctx: &StageContext<'_>, state: &MatchupState) -> AdjustmentStageResult;

    /// `(state) -> (state', result)`: evaluate and fold in one step.
    fn apply(
        &self,
        ctx: &StageContext<'_>,
        state: MatchupState,
    ) -> (MatchupState, AdjustmentStageResult) {
        let result = self.evaluate(ctx, &state);
        (state.apply(&result), result)
    }
}

/// The stages in pipeline order.
pub fn default_stages() -> Vec<Box<dyn AdjustmentStage>> {
    vec![
        Box::new(BaselineProjector),
        Box::new(TurnoverAdjuster),
        Box::new(DefensiveTierAdjuster),
        Box::new(ShootoutAdjuster),
        Box::new(RecentFormAdjuster),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_apply_accumulates() {
        let state = MatchupState::new(75);
        let mut result = AdjustmentStageResult::new("test", "");
        result.home_delta = 110.0;
        result.away_delta = 105.5;
        result.confidence_delta = -2;

        let next = state.apply(&result);
        assert_eq!(next.home_score, 110.0);
        assert_eq!(next.away_score, 105.5);
        assert_eq!(next.confidence, 73);
        assert_eq!(next.score(TeamSide::Away), 105.5);
    }

    #[test]
    fn test_result_side_accessors() {
        let mut result = AdjustmentStageResult::new("test", "");
        assert!(result.is_neutral());
        result.set_delta(TeamSide::Away, 1.5);
        assert_eq!(result.delta(TeamSide::Away), 1.5);
        assert_eq!(result.delta(TeamSide::Home), 0.0);
        assert!(!result.is_neutral());
    }

    #[test]
    fn test_breakdown_serializes_hundredths() {
        let mut result = AdjustmentStageResult::new("recent_form", "why");
        result.home_delta = 2.2000000000000028 * 0.25;
        result.away_delta = -4.12;
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stage"], "recent_form");
        assert_eq!(json["home_delta"], 0.55);
        assert_eq!(json["away_delta"], -4.12);
        assert_eq!(json["confidence_delta"], 0);
        assert!(json.get("issues").is_none());
    }

    #[test]
    fn test_default_stage_order() {
        let names: Vec<_> = default_stages().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "baseline",
                "turnover_differential",
                "defensive_tier",
                "shootout_potential",
                "recent_form",
            ]
        );
    }
}
