//! Traceability scoring rules.
//!
//! Everything here is a pure function over already-typed inputs: no I/O, no
//! failure modes. Scores live in `[0, 100]` and map onto a three-step risk scale.

mod aggregate;
mod impact;
mod initial;

pub use aggregate::{
    calculate_project_score, positive_decisions, problematic_decisions, score_timeline,
    ProjectScore, ScorePoint,
};
pub use impact::{calculate_decision_impact, decision_weight, FINANCIAL_IMPACT_MULTIPLIER};
pub use initial::{
    calculate_initial_score, calibration_breakdown, status_base, type_modifier,
    CalibrationComponent, InitialScoreBreakdown,
};

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u8 = 100;
pub const LOW_RISK_THRESHOLD: u8 = 75;
pub const MEDIUM_RISK_THRESHOLD: u8 = 50;

/// Risk classification derived from a traceability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn from_score(score: u8) -> Self {
        if score >= LOW_RISK_THRESHOLD {
            Self::Low
        } else if score >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Nearest integer with halves going toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    round_half_up(value.clamp(0.0, MAX_SCORE as f64)) as u8
}
