//! Recent form adjustment
//!
//! Compares each team's trailing-window averages with its season figures.
//!
//! Only the scoring trend moves the score:
//! - `ppg_change = recent_ppg - season_ppg`
//! - weight chosen by `|ppg_change|` (larger swings trusted more)
//! - `score_delta = clamp(ppg_change × weight, -cap, +cap)`
//!
//! ORTG, DRTG and pace trends are confidence-only signals. Their scoring
//! impact is already carried by the baseline and the season ratings, so
//! counting them again here would double-count.
//!
//! Calibration examples with the default tables:
//! - +2.2 PPG  → weight 0.25 → +0.55
//! - +6.4 PPG  → weight 0.35 → +2.24
//! - -10.3 PPG → weight 0.40 → -4.12
//! - +25 PPG   → weight 0.40 → +10.0, capped at +8.0

use super::{AdjustmentStage, AdjustmentStageResult, MatchupState, StageContext};
use crate::config::PredictionConfig;
use crate::error::DataIssue;
use crate::league_config::LeagueProfile;
use crate::models::{TeamSide, TeamSnapshot};

/// Weight applied to a PPG change of this size.
pub fn recent_form_weight(config: &PredictionConfig, ppg_change: f64) -> f64 {
    config.recent_form_weights.lookup(ppg_change)
}

/// Score delta for a PPG change, clamped to the configured cap.
pub fn recent_form_score_delta(config: &PredictionConfig, ppg_change: f64) -> f64 {
    if !ppg_change.is_finite() {
        return 0.0;
    }
    let cap = config.recent_score_cap;
    (ppg_change * recent_form_weight(config, ppg_change)).clamp(-cap, cap)
}

/// One team's recent-form signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamForm {
    pub games: usize,
    pub window: usize,
    pub ppg_change: Option<f64>,
    pub weight: f64,
    pub score_delta: f64,
    pub ortg_change: Option<f64>,
    pub ortg_confidence: i32,
    pub drtg_change: Option<f64>,
    pub drtg_confidence: i32,
    pub pace_change: Option<f64>,
    pub pace_confidence: i32,
}

impl TeamForm {
    pub fn confidence_delta(&self) -> i32 {
        self.ortg_confidence + self.drtg_confidence + self.pace_confidence
    }

    fn describe(&self, team: &str) -> String {
        if self.games == 0 {
            return format!("{team}: no recent games");
        }

        let mut parts = Vec::new();
        match self.ppg_change {
            Some(change) => parts.push(format!(
                "PPG {:+.1} x{:.2} = {:+.2}",
                change, self.weight, self.score_delta
            )),
            None => parts.push("PPG n/a".to_string()),
        }
        for (label, change, confidence) in [
            ("ORTG", self.ortg_change, self.ortg_confidence),
            ("DRTG", self.drtg_change, self.drtg_confidence),
            ("pace", self.pace_change, self.pace_confidence),
        ] {
            match change {
                Some(change) if confidence != 0 => {
                    parts.push(format!("{label} {change:+.1} (conf {confidence:+})"))
                }
                Some(change) => parts.push(format!("{label} {change:+.1}")),
                None => parts.push(format!("{label} n/a")),
            }
        }
        if self.games < self.window {
            parts.push(format!("small sample {}/{}", self.games, self.window));
        }

        format!("{team}: {}", parts.join(", "))
    }
}

fn change(recent: Option<f64>, season: f64) -> Option<f64> {
    recent.filter(|_| season.is_finite()).map(|r| r - season)
}

/// Compute one team's recent form against its season row.
///
/// Fails soft: a missing average contributes no delta and no confidence.
pub fn assess_team(
    team: &TeamSnapshot,
    config: &PredictionConfig,
    league: &LeagueProfile,
) -> (TeamForm, Vec<DataIssue>) {
    let window = team.recent_window(config.recent_window);
    let averages = window.averages();
    let season = &team.season;

    let mut form = TeamForm {
        games: averages.games,
        window: window.window,
        ..TeamForm::default()
    };

    if averages.games == 0 {
        return (form, window.issues);
    }

    // An unusable season PPG was already replaced by the recent mean upstream
    form.ppg_change = season
        .valid_points_per_game()
        .and_then(|ppg| change(averages.points, ppg));
    if let Some(ppg_change) = form.ppg_change {
        form.weight = recent_form_weight(config, ppg_change);
        form.score_delta = recent_form_score_delta(config, ppg_change);
    }

    form.ortg_change = change(averages.offensive_rating, season.offensive_rating);
    if let Some(ortg_change) = form.ortg_change {
        form.ortg_confidence = config.ortg_trend_confidence.lookup_confidence(ortg_change);
    }

    // Volatility either way is penalised: the table is keyed on magnitude
    form.drtg_change = change(averages.defensive_rating, season.defensive_rating);
    if let Some(drtg_change) = form.drtg_change {
        form.drtg_confidence = config
            .drtg_volatility_confidence
            .lookup_confidence(drtg_change);
    }

    form.pace_change = season
        .plausible_pace(league)
        .and_then(|pace| change(averages.pace, pace));
    if let Some(pace_change) = form.pace_change {
        form.pace_confidence = config.pace_trend_confidence.lookup_confidence(pace_change);
    }

    (form, window.issues)
}

pub struct RecentFormAdjuster;

impl AdjustmentStage for RecentFormAdjuster {
    fn name(&self) -> &'static str {
        "recent_form"
    }

    fn evaluate(&self, ctx: &StageContext<'_>, _state: &MatchupState) -> AdjustmentStageResult {
        let mut result = AdjustmentStageResult::new(self.name(), "");
        let mut notes = Vec::with_capacity(2);

        for side in [TeamSide::Home, TeamSide::Away] {
            let team = ctx.input.team(side);
            let (form, issues) = assess_team(team, ctx.config, ctx.league);

            result.set_delta(side, form.score_delta);
            result.confidence_delta += form.confidence_delta();
            result.issues.extend(issues);
            notes.push(form.describe(team.team_id()));
        }

        result.rationale = notes.join("; ");
        result
    }
}
