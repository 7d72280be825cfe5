//! Totals Core - Game-total projection for basketball matchups.
//!
//! This module provides:
//! - Baseline projection from season scoring rate scaled to matchup pace
//! - Situational adjusters (turnover differential, opponent defensive tier,
//!   shootout potential)
//! - Recent-form adjustment with magnitude-weighted, capped score deltas
//! - Bounded confidence built from independent signals
//! - A structured per-stage breakdown for every prediction
//! - Batch prediction via rayon
//!
//! The core performs no I/O. Callers fetch statistics, build a
//! `MatchupInput`, and own the returned `PredictionResult`.

pub mod config;
pub mod engine;
pub mod error;
pub mod league_config;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use config::{PacePolicy, PredictionConfig, StepTable};
pub use engine::{batch_predict, PredictionEngine};
pub use error::{ConfigError, DataIssue};
pub use models::{
    MatchupInput, RecentGameRecord, Split, SplitSelector, TeamSeasonStats, TeamSide, TeamSnapshot,
};
pub use pipeline::{AdjustmentStage, AdjustmentStageResult, MatchupState, PredictionResult};
pub use utils::points::Points;
