use serde::Serialize;

use super::super::calibration::{CalibrationAnswer, CalibrationCategory, ProjectCalibration};
use super::super::domain::{ProjectStatus, ProjectType};
use super::{clamp_score, RiskLevel};

/// Points earned by one answered calibration question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalibrationComponent {
    pub question: &'static str,
    pub category: CalibrationCategory,
    pub answer: CalibrationAnswer,
    pub points: i32,
}

/// Auditable trail behind an initial score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialScoreBreakdown {
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub base: i32,
    pub type_modifier: i32,
    pub components: Vec<CalibrationComponent>,
    pub raw_total: i32,
    pub score: u8,
    pub risk_level: RiskLevel,
}

pub const fn status_base(status: ProjectStatus) -> i32 {
    match status {
        ProjectStatus::New => 75,
        ProjectStatus::Ongoing => 50,
    }
}

pub const fn type_modifier(project_type: ProjectType) -> i32 {
    match project_type {
        ProjectType::Individual => 0,
        ProjectType::Renovation => -5,
        ProjectType::Tertiary => -3,
    }
}

pub fn calibration_breakdown(
    project_type: ProjectType,
    calibration: &ProjectCalibration,
) -> InitialScoreBreakdown {
    let status = calibration.status();
    let base = status_base(status);
    let modifier = type_modifier(project_type);

    let components: Vec<CalibrationComponent> = calibration
        .answers()
        .into_iter()
        .filter_map(|(question, answer)| {
            answer.map(|answer| CalibrationComponent {
                question: question.key,
                category: question.category,
                answer,
                points: question.points(answer),
            })
        })
        .collect();

    let raw_total = base + modifier + components.iter().map(|c| c.points).sum::<i32>();
    let score = clamp_score(raw_total as f64);

    InitialScoreBreakdown {
        status,
        project_type,
        base,
        type_modifier: modifier,
        components,
        raw_total,
        score,
        risk_level: RiskLevel::from_score(score),
    }
}

/// Initial traceability score from the one-time questionnaire.
pub fn calculate_initial_score(project_type: ProjectType, calibration: &ProjectCalibration) -> u8 {
    calibration_breakdown(project_type, calibration).score
}
