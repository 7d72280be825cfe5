//! Final fold over the stage results.
//!
//! Scores come from the running accumulators and are rounded once, here.
//! Confidence is the base plus every stage's delta, clamped to the
//! configured bounds.

use serde::Serialize;

use super::{AdjustmentStageResult, MatchupState};
use crate::config::PredictionConfig;
use crate::error::DataIssue;
use crate::utils::points::Points;

/// Projected outcome for one matchup. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub home_score: Points,
    pub away_score: Points,
    pub total: Points,
    pub confidence: i32,
    pub breakdown: Vec<AdjustmentStageResult>,

    #[serde(skip)]
    pub home_team: String,
    #[serde(skip)]
    pub away_team: String,
    /// Confidence before clamping
    #[serde(skip)]
    pub raw_confidence: i32,
    /// Every degradation met while resolving inputs and running stages
    #[serde(skip)]
    pub degradations: Vec<DataIssue>,
}

impl PredictionResult {
    /// Flat JSON output: scores, total, confidence and the stage breakdown.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn stage(&self, name: &str) -> Option<&AdjustmentStageResult> {
        self.breakdown.iter().find(|r| r.stage == name)
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} {} @ {} {} | total {} | confidence {}%{}",
            self.away_team,
            self.away_score,
            self.home_team,
            self.home_score,
            self.total,
            self.confidence,
            if self.is_degraded() {
                format!(" ({} data issues)", self.degradations.len())
            } else {
                String::new()
            }
        )
    }
}

/// Assemble the result from the final state and the ordered breakdown.
pub fn aggregate(
    config: &PredictionConfig,
    home_team: &str,
    away_team: &str,
    state: MatchupState,
    breakdown: Vec<AdjustmentStageResult>,
    resolution_issues: &[DataIssue],
) -> PredictionResult {
    let raw_confidence = breakdown
        .iter()
        .fold(config.base_confidence, |acc, r| acc + r.confidence_delta);
    let confidence = raw_confidence.clamp(config.confidence_min, config.confidence_max);

    let home_score = Points::from_f64(state.home_score);
    let away_score = Points::from_f64(state.away_score);

    let degradations = resolution_issues
        .iter()
        .chain(breakdown.iter().flat_map(|r| r.issues.iter()))
        .cloned()
        .collect();

    PredictionResult {
        home_score,
        away_score,
        total: home_score + away_score,
        confidence,
        breakdown,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        raw_confidence,
        degradations,
    }
}
