use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{Decision, DecisionId};
use super::{clamp_score, RiskLevel};

/// Current score and its risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectScore {
    pub score: u8,
    pub risk_level: RiskLevel,
}

impl ProjectScore {
    fn from_score(score: u8) -> Self {
        Self {
            score,
            risk_level: RiskLevel::from_score(score),
        }
    }
}

/// Score after a given decision, in append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorePoint {
    pub decision_id: DecisionId,
    pub decided_on: NaiveDate,
    pub score_impact: i32,
    pub score: u8,
    pub risk_level: RiskLevel,
}

fn normalized_score(initial_score: u8, impact_sum: i64, decision_count: usize) -> u8 {
    if decision_count == 0 {
        return initial_score;
    }
    let adjustment = impact_sum as f64 / (decision_count as f64 * 0.5);
    clamp_score(initial_score as f64 + adjustment)
}

/// Fold every decision's impact into the project score.
///
/// Recomputed in full on each append; linear in the number of decisions.
pub fn calculate_project_score(initial_score: u8, decisions: &[Decision]) -> ProjectScore {
    let impact_sum: i64 = decisions
        .iter()
        .map(|decision| decision.score_impact as i64)
        .sum();
    ProjectScore::from_score(normalized_score(
        initial_score,
        impact_sum,
        decisions.len(),
    ))
}

/// Score evolution, one point per decision.
pub fn score_timeline(initial_score: u8, decisions: &[Decision]) -> Vec<ScorePoint> {
    let mut impact_sum: i64 = 0;
    decisions
        .iter()
        .enumerate()
        .map(|(index, decision)| {
            impact_sum += decision.score_impact as i64;
            let score = normalized_score(initial_score, impact_sum, index + 1);
            ScorePoint {
                decision_id: decision.id.clone(),
                decided_on: decision.decided_on,
                score_impact: decision.score_impact,
                score,
                risk_level: RiskLevel::from_score(score),
            }
        })
        .collect()
}

/// Decisions that cost points, most damaging first.
pub fn problematic_decisions(decisions: &[Decision]) -> Vec<&Decision> {
    let mut problematic: Vec<&Decision> = decisions
        .iter()
        .filter(|decision| decision.score_impact < 0)
        .collect();
    problematic.sort_by_key(|decision| decision.score_impact);
    problematic
}

/// Decisions that earned points, best first.
pub fn positive_decisions(decisions: &[Decision]) -> Vec<&Decision> {
    let mut positive: Vec<&Decision> = decisions
        .iter()
        .filter(|decision| decision.score_impact > 0)
        .collect();
    positive.sort_by_key(|decision| std::cmp::Reverse(decision.score_impact));
    positive
}
