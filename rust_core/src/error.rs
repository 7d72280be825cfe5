//! Error taxonomy for the projection engine.
//!
//! Two families live here:
//! - `ConfigError`: malformed constants, raised once when an engine is built
//! - `DataIssue`: per-request degradations that never abort a prediction

use serde::Serialize;
use thiserror::Error;

/// Invalid engine configuration. Fatal at construction time only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("table '{table}' has non-decreasing thresholds at tier {index}")]
    NonMonotonicThresholds { table: &'static str, index: usize },

    #[error("table '{table}' has a larger effect at tier {index} than at the tier above it")]
    NonMonotonicValues { table: &'static str, index: usize },

    #[error("table '{table}' value {value} is outside [0, 1]")]
    WeightOutOfRange { table: &'static str, value: f64 },

    #[error("table '{table}' confidence step {value} is not a whole number")]
    FractionalConfidence { table: &'static str, value: f64 },

    #[error("'{field}' must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("confidence bounds inverted: min {min} > max {max}")]
    InvertedConfidenceBounds { min: i32, max: i32 },

    #[error("base confidence {base} outside bounds [{min}, {max}]")]
    BaseConfidenceOutOfBounds { base: i32, min: i32, max: i32 },

    #[error("recent window must contain at least one game")]
    EmptyRecentWindow,

    #[error("'{field}' must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("unknown league '{0}'")]
    UnknownLeague(String),

    #[error("unknown pace policy '{0}'")]
    UnknownPacePolicy(String),
}

/// A per-request degradation recorded against one team.
///
/// These are collected on the prediction result and folded into stage
/// rationales; they are never returned as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    #[error("data quality: {team} {field} {detail}")]
    DataQuality {
        team: String,
        field: &'static str,
        detail: String,
    },

    #[error("insufficient history: {team} has {available} of {window} recent games")]
    InsufficientHistory {
        team: String,
        available: usize,
        window: usize,
    },
}

impl DataIssue {
    pub fn data_quality(team: &str, field: &'static str, detail: impl Into<String>) -> Self {
        DataIssue::DataQuality {
            team: team.to_string(),
            field,
            detail: detail.into(),
        }
    }

    /// Team the issue was recorded against.
    pub fn team(&self) -> &str {
        match self {
            DataIssue::DataQuality { team, .. } => team,
            DataIssue::InsufficientHistory { team, .. } => team,
        }
    }
}
