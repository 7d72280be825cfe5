//! Prediction engine: runs the stage pipeline for one matchup at a time.
//!
//! An engine is built once per process from a validated configuration and
//! then shared freely. It holds no mutable state, so predictions for
//! different matchups can run in parallel without coordination.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PredictionConfig;
use crate::error::ConfigError;
use crate::league_config::{get_league_profile, LeagueProfile};
use crate::models::MatchupInput;
use crate::pipeline::{
    aggregate, default_stages, AdjustmentStage, MatchupState, PredictionResult, StageContext,
};

pub struct PredictionEngine {
    config: PredictionConfig,
    league: &'static LeagueProfile,
    stages: Vec<Box<dyn AdjustmentStage>>,
}

impl PredictionEngine {
    /// Validate `config` and build the fixed stage pipeline.
    pub fn new(config: PredictionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let league = get_league_profile(&config.league)
            .ok_or_else(|| ConfigError::UnknownLeague(config.league.clone()))?;

        let engine = Self {
            config,
            league,
            stages: default_stages(),
        };
        info!(
            "Prediction engine ready: league={} window={} pace_policy={} confidence={} [{}, {}] stages={:?}",
            engine.league.league_code,
            engine.config.recent_window,
            engine.config.pace_policy.as_str(),
            engine.config.base_confidence,
            engine.config.confidence_min,
            engine.config.confidence_max,
            engine.stage_names(),
        );
        Ok(engine)
    }

    /// Build from `TOTALS_*` environment overrides on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(PredictionConfig::from_env()?)
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn league(&self) -> &'static LeagueProfile {
        self.league
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Project the total for one matchup.
    ///
    /// Never fails: bad or thin inputs degrade the affected stage and are
    /// reported on the result.
    pub fn predict(&self, input: &MatchupInput) -> PredictionResult {
        let ctx = StageContext {
            input,
            config: &self.config,
            league: self.league,
        };

        for issue in &input.resolution_issues {
            warn!("{} @ {}: {}", input.away_team, input.home_team, issue);
        }

        let mut state = MatchupState::new(self.config.base_confidence);
        let mut breakdown = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let (next, result) = stage.apply(&ctx, state);
            debug!(
                "{} @ {} [{}] home {:+.2} away {:+.2} conf {:+} :: {}",
                input.away_team,
                input.home_team,
                result.stage,
                result.home_delta,
                result.away_delta,
                result.confidence_delta,
                result.rationale
            );
            for issue in &result.issues {
                warn!(
                    "{} @ {} [{}]: {}",
                    input.away_team, input.home_team, result.stage, issue
                );
            }
            state = next;
            breakdown.push(result);
        }

        let result = aggregate(
            &self.config,
            &input.home_team,
            &input.away_team,
            state,
            breakdown,
            &input.resolution_issues,
        );
        debug!("{}", result.summary());
        result
    }
}

/// Batch predict multiple matchups.
///
/// Uses parallel processing; output order matches input order.
pub fn batch_predict(engine: &PredictionEngine, inputs: &[MatchupInput]) -> Vec<PredictionResult> {
    inputs.par_iter().map(|input| engine.predict(input)).collect()
}
