//! Configuration constants and loading for the projection engine
//!
//! This module manages every hand-tuned constant:
//! - Recent-form weight table and score cap
//! - Confidence step tables (ORTG, DRTG, pace, shootout)
//! - Situational point tables (turnovers, defensive tier, shootout)
//! - Confidence base and bounds
//! - Matchup pace policy and league
//!
//! Constants are validated once, when an engine is built. Nothing in here is
//! consulted for validity at request time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::league_config::get_league_profile;

/// Default league code
pub const DEFAULT_LEAGUE: &str = "nba";

/// Confidence before any stage contributes
pub const DEFAULT_BASE_CONFIDENCE: i32 = 75;

/// Closed range the final confidence is clamped to
pub const DEFAULT_CONFIDENCE_MIN: i32 = 40;
pub const DEFAULT_CONFIDENCE_MAX: i32 = 95;

/// Default number of trailing games used for recent form
pub const DEFAULT_RECENT_WINDOW: usize = 10;

/// Largest score adjustment recent form may apply to one team
pub const DEFAULT_RECENT_SCORE_CAP: f64 = 8.0;

// ============================================================================
// Step Tables
// ============================================================================

/// One row of a step table: applies when `|x| >= min_magnitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min_magnitude: f64,
    pub value: f64,
}

/// Piecewise-constant lookup keyed on the magnitude of a differential.
///
/// Tiers are ordered from the highest threshold down; the first tier whose
/// threshold the magnitude reaches wins, otherwise `fallback` applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTable {
    pub tiers: Vec<Tier>,
    pub fallback: f64,
}

impl StepTable {
    pub fn new(tiers: &[(f64, f64)], fallback: f64) -> Self {
        Self {
            tiers: tiers
                .iter()
                .map(|&(min_magnitude, value)| Tier {
                    min_magnitude,
                    value,
                })
                .collect(),
            fallback,
        }
    }

    /// Look up the value for a differential (sign is ignored).
    pub fn lookup(&self, differential: f64) -> f64 {
        let magnitude = differential.abs();
        self.tiers
            .iter()
            .find(|t| magnitude >= t.min_magnitude)
            .map(|t| t.value)
            .unwrap_or(self.fallback)
    }

    /// Confidence tables hold whole-number steps.
    pub fn lookup_confidence(&self, differential: f64) -> i32 {
        self.lookup(differential).round() as i32
    }

    /// Thresholds strictly decreasing, effects never growing as thresholds fall.
    pub fn validate(&self, table: &'static str) -> Result<(), ConfigError> {
        for (index, tier) in self.tiers.iter().enumerate() {
            if !tier.min_magnitude.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: table,
                    value: tier.min_magnitude,
                });
            }
            if !tier.value.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: table,
                    value: tier.value,
                });
            }
            if tier.min_magnitude < 0.0 {
                return Err(ConfigError::Negative {
                    field: table,
                    value: tier.min_magnitude,
                });
            }
            if index > 0 {
                let above = &self.tiers[index - 1];
                if tier.min_magnitude >= above.min_magnitude {
                    return Err(ConfigError::NonMonotonicThresholds { table, index });
                }
                if tier.value.abs() > above.value.abs() {
                    return Err(ConfigError::NonMonotonicValues { table, index });
                }
            }
        }

        if !self.fallback.is_finite() {
            return Err(ConfigError::NonFinite {
                field: table,
                value: self.fallback,
            });
        }
        if let Some(lowest) = self.tiers.last() {
            if self.fallback.abs() > lowest.value.abs() {
                return Err(ConfigError::NonMonotonicValues {
                    table,
                    index: self.tiers.len(),
                });
            }
        }
        Ok(())
    }

    /// As `validate`, plus every value must be a weight in [0, 1].
    pub fn validate_weights(&self, table: &'static str) -> Result<(), ConfigError> {
        self.validate(table)?;
        let values = self.tiers.iter().map(|t| t.value).chain([self.fallback]);
        for value in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange { table, value });
            }
        }
        Ok(())
    }

    /// As `validate`, plus every value must be a whole confidence step.
    pub fn validate_confidence(&self, table: &'static str) -> Result<(), ConfigError> {
        self.validate(table)?;
        let values = self.tiers.iter().map(|t| t.value).chain([self.fallback]);
        for value in values {
            if value.fract() != 0.0 {
                return Err(ConfigError::FractionalConfidence { table, value });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Pace Policy
// ============================================================================

/// How the two teams' season paces combine into a matchup pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacePolicy {
    /// Simple mean of both paces.
    #[default]
    Average,
    /// Possession-weighted (harmonic) mean.
    Harmonic,
    /// The faster team dictates tempo.
    FasterTeam,
}

impl PacePolicy {
    pub fn combine(&self, home_pace: f64, away_pace: f64) -> f64 {
        match self {
            PacePolicy::Average => (home_pace + away_pace) / 2.0,
            PacePolicy::Harmonic => 2.0 * home_pace * away_pace / (home_pace + away_pace),
            PacePolicy::FasterTeam => home_pace.max(away_pace),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PacePolicy::Average => "average",
            PacePolicy::Harmonic => "harmonic",
            PacePolicy::FasterTeam => "faster_team",
        }
    }
}

impl FromStr for PacePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "average" | "avg" => Ok(PacePolicy::Average),
            "harmonic" => Ok(PacePolicy::Harmonic),
            "faster_team" | "faster" => Ok(PacePolicy::FasterTeam),
            other => Err(ConfigError::UnknownPacePolicy(other.to_string())),
        }
    }
}

// ============================================================================
// Prediction Config
// ============================================================================

/// Every constant the pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub league: String,
    pub pace_policy: PacePolicy,

    pub base_confidence: i32,
    pub confidence_min: i32,
    pub confidence_max: i32,

    /// Trailing games considered for recent form
    pub recent_window: usize,
    /// Weight applied to the PPG change, keyed on |PPG change|
    pub recent_form_weights: StepTable,
    /// Recent-form score delta is clamped to ±cap
    pub recent_score_cap: f64,
    pub ortg_trend_confidence: StepTable,
    pub drtg_volatility_confidence: StepTable,
    pub pace_trend_confidence: StepTable,

    /// Points awarded for a turnover-rate edge (per 100 possessions)
    pub turnover_points: StepTable,
    /// Confidence added when the turnover edge moves the score
    pub turnover_confidence: i32,
    /// Points for facing a defense away from league average DRTG
    pub defensive_tier_points: StepTable,
    /// Points per team for a combined 3PA rate above league average
    pub shootout_points: StepTable,
    pub shootout_confidence: StepTable,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            league: DEFAULT_LEAGUE.to_string(),
            pace_policy: PacePolicy::Average,
            base_confidence: DEFAULT_BASE_CONFIDENCE,
            confidence_min: DEFAULT_CONFIDENCE_MIN,
            confidence_max: DEFAULT_CONFIDENCE_MAX,
            recent_window: DEFAULT_RECENT_WINDOW,
            recent_form_weights: StepTable::new(&[(8.0, 0.40), (5.0, 0.35)], 0.25),
            recent_score_cap: DEFAULT_RECENT_SCORE_CAP,
            ortg_trend_confidence: StepTable::new(&[(7.0, 3.0), (5.0, 2.0)], 0.0),
            drtg_volatility_confidence: StepTable::new(&[(6.0, -3.0), (4.0, -2.0)], 0.0),
            pace_trend_confidence: StepTable::new(&[(3.0, 2.0), (2.0, 1.0)], 0.0),
            turnover_points: StepTable::new(&[(3.0, 2.0), (1.5, 1.0)], 0.0),
            turnover_confidence: 1,
            defensive_tier_points: StepTable::new(&[(4.0, 3.0), (2.0, 1.5)], 0.0),
            shootout_points: StepTable::new(&[(0.06, 2.0), (0.03, 1.0)], 0.0),
            shootout_confidence: StepTable::new(&[(0.06, -2.0), (0.03, -1.0)], 0.0),
        }
    }
}

impl PredictionConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Apply `TOTALS_*` overrides from a key lookup.
    ///
    /// Unparseable numbers keep their current value; an unknown pace policy
    /// is an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|v| v.trim().parse::<T>().ok())
        }

        if let Some(league) = lookup("TOTALS_LEAGUE") {
            let league = league.trim().to_ascii_lowercase();
            let profile =
                get_league_profile(&league).ok_or(ConfigError::UnknownLeague(league))?;
            self.league = profile.league_code.to_string();
            self.recent_window = profile.default_recent_window;
        }
        if let Some(window) = parsed(lookup("TOTALS_RECENT_WINDOW")) {
            self.recent_window = window;
        }
        if let Some(base) = parsed(lookup("TOTALS_BASE_CONFIDENCE")) {
            self.base_confidence = base;
        }
        if let Some(min) = parsed(lookup("TOTALS_CONFIDENCE_MIN")) {
            self.confidence_min = min;
        }
        if let Some(max) = parsed(lookup("TOTALS_CONFIDENCE_MAX")) {
            self.confidence_max = max;
        }
        if let Some(cap) = parsed(lookup("TOTALS_RECENT_SCORE_CAP")) {
            self.recent_score_cap = cap;
        }
        if let Some(policy) = lookup("TOTALS_PACE_POLICY") {
            self.pace_policy = policy.parse()?;
        }
        Ok(())
    }

    /// Check every constant. Run once before any request is served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if get_league_profile(&self.league).is_none() {
            return Err(ConfigError::UnknownLeague(self.league.clone()));
        }

        if self.confidence_min > self.confidence_max {
            return Err(ConfigError::InvertedConfidenceBounds {
                min: self.confidence_min,
                max: self.confidence_max,
            });
        }
        if !(self.confidence_min..=self.confidence_max).contains(&self.base_confidence) {
            return Err(ConfigError::BaseConfidenceOutOfBounds {
                base: self.base_confidence,
                min: self.confidence_min,
                max: self.confidence_max,
            });
        }

        if self.recent_window == 0 {
            return Err(ConfigError::EmptyRecentWindow);
        }
        if !self.recent_score_cap.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "recent_score_cap",
                value: self.recent_score_cap,
            });
        }
        if self.recent_score_cap < 0.0 {
            return Err(ConfigError::Negative {
                field: "recent_score_cap",
                value: self.recent_score_cap,
            });
        }

        self.recent_form_weights
            .validate_weights("recent_form_weights")?;
        self.ortg_trend_confidence
            .validate_confidence("ortg_trend_confidence")?;
        self.drtg_volatility_confidence
            .validate_confidence("drtg_volatility_confidence")?;
        self.pace_trend_confidence
            .validate_confidence("pace_trend_confidence")?;
        self.turnover_points.validate("turnover_points")?;
        self.defensive_tier_points
            .validate("defensive_tier_points")?;
        self.shootout_points.validate("shootout_points")?;
        self.shootout_confidence
            .validate_confidence("shootout_confidence")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(PredictionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_recent_form_weight_lookup() {
        let weights = PredictionConfig::default().recent_form_weights;
        assert_eq!(weights.lookup(2.2), 0.25);
        assert_eq!(weights.lookup(5.0), 0.35);
        assert_eq!(weights.lookup(-6.4), 0.35);
        assert_eq!(weights.lookup(8.0), 0.40);
        assert_eq!(weights.lookup(-10.3), 0.40);
        assert_eq!(weights.lookup(f64::NAN), 0.25);
    }

    #[test]
    fn test_confidence_lookup_signs() {
        let config = PredictionConfig::default();
        assert_eq!(config.ortg_trend_confidence.lookup_confidence(5.8), 2);
        assert_eq!(config.ortg_trend_confidence.lookup_confidence(-7.0), 3);
        assert_eq!(config.drtg_volatility_confidence.lookup_confidence(7.2), -3);
        assert_eq!(config.drtg_volatility_confidence.lookup_confidence(-4.5), -2);
        assert_eq!(config.pace_trend_confidence.lookup_confidence(1.9), 0);
    }

    #[test]
    fn test_non_monotonic_thresholds_rejected() {
        let table = StepTable::new(&[(5.0, 0.35), (8.0, 0.40)], 0.25);
        assert_eq!(
            table.validate_weights("w"),
            Err(ConfigError::NonMonotonicThresholds { table: "w", index: 1 })
        );
    }

    #[test]
    fn test_shrinking_weights_rejected() {
        let table = StepTable::new(&[(8.0, 0.30), (5.0, 0.35)], 0.25);
        assert_eq!(
            table.validate_weights("w"),
            Err(ConfigError::NonMonotonicValues { table: "w", index: 1 })
        );

        let table = StepTable::new(&[(8.0, 0.40), (5.0, 0.35)], 0.50);
        assert_eq!(
            table.validate_weights("w"),
            Err(ConfigError::NonMonotonicValues { table: "w", index: 2 })
        );
    }

    #[test]
    fn test_weight_range_enforced() {
        let table = StepTable::new(&[(8.0, 1.5), (5.0, 0.35)], 0.25);
        assert_eq!(
            table.validate_weights("w"),
            Err(ConfigError::WeightOutOfRange { table: "w", value: 1.5 })
        );

        let mut config = PredictionConfig::default();
        config.recent_form_weights = StepTable::new(&[(8.0, -0.4)], -0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn test_fractional_confidence_rejected() {
        let mut config = PredictionConfig::default();
        config.ortg_trend_confidence = StepTable::new(&[(7.0, 2.5)], 0.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::FractionalConfidence {
                table: "ortg_trend_confidence",
                value: 2.5
            })
        );
    }

    #[test]
    fn test_bounds_and_window_rejected() {
        let mut config = PredictionConfig::default();
        config.confidence_min = 96;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedConfidenceBounds { .. })
        ));

        let mut config = PredictionConfig::default();
        config.base_confidence = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BaseConfidenceOutOfBounds { .. })
        ));

        let mut config = PredictionConfig::default();
        config.recent_window = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyRecentWindow));

        let mut config = PredictionConfig::default();
        config.recent_score_cap = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_pace_policies() {
        assert_eq!(PacePolicy::Average.combine(100.0, 96.0), 98.0);
        assert_eq!(PacePolicy::FasterTeam.combine(100.0, 96.0), 100.0);
        let harmonic = PacePolicy::Harmonic.combine(100.0, 96.0);
        assert!(harmonic < 98.0 && harmonic > 97.9);

        assert_eq!("Harmonic".parse::<PacePolicy>(), Ok(PacePolicy::Harmonic));
        assert_eq!("faster".parse::<PacePolicy>(), Ok(PacePolicy::FasterTeam));
        assert!("slowest".parse::<PacePolicy>().is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = PredictionConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("TOTALS_LEAGUE", "NCAAB"),
                ("TOTALS_BASE_CONFIDENCE", "70"),
                ("TOTALS_PACE_POLICY", "harmonic"),
                ("TOTALS_RECENT_SCORE_CAP", "not-a-number"),
            ]))
            .unwrap();

        assert_eq!(config.league, "ncaab");
        assert_eq!(config.recent_window, 5);
        assert_eq!(config.base_confidence, 70);
        assert_eq!(config.pace_policy, PacePolicy::Harmonic);
        assert_eq!(config.recent_score_cap, DEFAULT_RECENT_SCORE_CAP);
    }

    #[test]
    fn test_explicit_window_beats_league_default() {
        let mut config = PredictionConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("TOTALS_LEAGUE", "wnba"),
                ("TOTALS_RECENT_WINDOW", "8"),
            ]))
            .unwrap();
        assert_eq!(config.recent_window, 8);
    }

    #[test]
    fn test_unknown_override_values_rejected() {
        let mut config = PredictionConfig::default();
        assert_eq!(
            config.apply_overrides(lookup_from(&[("TOTALS_PACE_POLICY", "warp")])),
            Err(ConfigError::UnknownPacePolicy("warp".to_string()))
        );
        assert_eq!(
            config.apply_overrides(lookup_from(&[("TOTALS_LEAGUE", "kbl")])),
            Err(ConfigError::UnknownLeague("kbl".to_string()))
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PredictionConfig =
            serde_json::from_str(r#"{"base_confidence": 70, "pace_policy": "faster_team"}"#)
                .unwrap();
        assert_eq!(config.base_confidence, 70);
        assert_eq!(config.pace_policy, PacePolicy::FasterTeam);
        assert_eq!(config.recent_window, DEFAULT_RECENT_WINDOW);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_from_json_file_reports_invalid_config() {
        let path = std::env::temp_dir().join("totals_core_invalid_config.json");
        std::fs::write(&path, r#"{"recent_window": 0}"#).unwrap();
        let err = PredictionConfig::from_json_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("recent window"));
        std::fs::remove_file(&path).ok();
    }
}
