use serde::{Deserialize, Serialize};

use super::domain::ProjectStatus;

/// Answer to a calibration question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationAnswer {
    Yes,
    No,
    Unknown,
}

impl CalibrationAnswer {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationCategory {
    ContractualRigor,
    SiteStart,
    OngoingRisk,
    DocumentaryMaturity,
}

impl CalibrationCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ContractualRigor => "Contractual rigor",
            Self::SiteStart => "Site start checks",
            Self::OngoingRisk => "Ongoing project risk",
            Self::DocumentaryMaturity => "Documentary maturity",
        }
    }
}

/// Fixed questionnaire entry with its reward and penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationQuestion {
    pub key: &'static str,
    pub category: CalibrationCategory,
    pub prompt: &'static str,
    pub yes_points: i32,
    pub no_penalty: i32,
}

impl CalibrationQuestion {
    /// Points earned by an answer. Uncertainty costs half the "no" penalty, rounded down.
    pub fn points(&self, answer: CalibrationAnswer) -> i32 {
        match answer {
            CalibrationAnswer::Yes => self.yes_points,
            CalibrationAnswer::No => -self.no_penalty,
            CalibrationAnswer::Unknown => (-self.no_penalty).div_euclid(2),
        }
    }
}

pub const SIGNED_MOE_CONTRACT: CalibrationQuestion = CalibrationQuestion {
    key: "signed_moe_contract",
    category: CalibrationCategory::ContractualRigor,
    prompt: "Is the supervision contract signed by the client?",
    yes_points: 5,
    no_penalty: 10,
};

pub const DETAILED_PROGRAM: CalibrationQuestion = CalibrationQuestion {
    key: "detailed_program",
    category: CalibrationCategory::ContractualRigor,
    prompt: "Is the client's program written down in detail?",
    yes_points: 3,
    no_penalty: 6,
};

pub const BUDGET_VALIDATED_IN_WRITING: CalibrationQuestion = CalibrationQuestion {
    key: "budget_validated_in_writing",
    category: CalibrationCategory::ContractualRigor,
    prompt: "Has the client validated the works budget in writing?",
    yes_points: 4,
    no_penalty: 8,
};

pub const BUILDING_PERMIT_OBTAINED: CalibrationQuestion = CalibrationQuestion {
    key: "building_permit_obtained",
    category: CalibrationCategory::SiteStart,
    prompt: "Is the building permit or prior declaration obtained and displayed?",
    yes_points: 3,
    no_penalty: 6,
};

pub const COMPANIES_INSURED: CalibrationQuestion = CalibrationQuestion {
    key: "companies_insured",
    category: CalibrationCategory::SiteStart,
    prompt: "Have all companies provided their decennial insurance certificates?",
    yes_points: 3,
    no_penalty: 6,
};

pub const START_ORDER_ISSUED: CalibrationQuestion = CalibrationQuestion {
    key: "start_order_issued",
    category: CalibrationCategory::SiteStart,
    prompt: "Has a written start order been issued to the companies?",
    yes_points: 2,
    no_penalty: 4,
};

pub const WRITTEN_AMENDMENTS: CalibrationQuestion = CalibrationQuestion {
    key: "written_amendments",
    category: CalibrationCategory::OngoingRisk,
    prompt: "Are all changes since the start covered by signed amendments?",
    yes_points: 4,
    no_penalty: 8,
};

pub const SITE_REPORTS_DISTRIBUTED: CalibrationQuestion = CalibrationQuestion {
    key: "site_reports_distributed",
    category: CalibrationCategory::OngoingRisk,
    prompt: "Are site meeting reports distributed after each visit?",
    yes_points: 3,
    no_penalty: 6,
};

pub const DISPUTES_UNDER_CONTROL: CalibrationQuestion = CalibrationQuestion {
    key: "disputes_under_control",
    category: CalibrationCategory::OngoingRisk,
    prompt: "Is the project free of open disputes with the client or companies?",
    yes_points: 3,
    no_penalty: 8,
};

pub const PAYMENTS_UP_TO_DATE: CalibrationQuestion = CalibrationQuestion {
    key: "payments_up_to_date",
    category: CalibrationCategory::OngoingRisk,
    prompt: "Are payment applications validated and paid on time?",
    yes_points: 3,
    no_penalty: 6,
};

pub const SCHEDULE_ON_TRACK: CalibrationQuestion = CalibrationQuestion {
    key: "schedule_on_track",
    category: CalibrationCategory::OngoingRisk,
    prompt: "Is the works schedule on track?",
    yes_points: 2,
    no_penalty: 4,
};

pub const DECISIONS_RECORDED_IN_WRITING: CalibrationQuestion = CalibrationQuestion {
    key: "decisions_recorded_in_writing",
    category: CalibrationCategory::DocumentaryMaturity,
    prompt: "Are client decisions systematically confirmed in writing?",
    yes_points: 4,
    no_penalty: 8,
};

pub const PROOFS_ARCHIVED: CalibrationQuestion = CalibrationQuestion {
    key: "proofs_archived",
    category: CalibrationCategory::DocumentaryMaturity,
    prompt: "Are proofs (photos, emails, signed plans) archived per project?",
    yes_points: 3,
    no_penalty: 6,
};

/// Questions shared by every project status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentaryMaturity {
    pub decisions_recorded_in_writing: Option<CalibrationAnswer>,
    pub proofs_archived: Option<CalibrationAnswer>,
}

impl DocumentaryMaturity {
    pub fn uniform(answer: CalibrationAnswer) -> Self {
        Self {
            decisions_recorded_in_writing: Some(answer),
            proofs_archived: Some(answer),
        }
    }

    fn answers(&self) -> [(CalibrationQuestion, Option<CalibrationAnswer>); 2] {
        [
            (
                DECISIONS_RECORDED_IN_WRITING,
                self.decisions_recorded_in_writing,
            ),
            (PROOFS_ARCHIVED, self.proofs_archived),
        ]
    }
}

/// Questionnaire for a project registered before works start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProjectCalibration {
    pub signed_moe_contract: Option<CalibrationAnswer>,
    pub detailed_program: Option<CalibrationAnswer>,
    pub budget_validated_in_writing: Option<CalibrationAnswer>,
    pub building_permit_obtained: Option<CalibrationAnswer>,
    pub companies_insured: Option<CalibrationAnswer>,
    pub start_order_issued: Option<CalibrationAnswer>,
    pub documentary_maturity: DocumentaryMaturity,
}

impl NewProjectCalibration {
    /// Every question answered the same way.
    pub fn uniform(answer: CalibrationAnswer) -> Self {
        Self {
            signed_moe_contract: Some(answer),
            detailed_program: Some(answer),
            budget_validated_in_writing: Some(answer),
            building_permit_obtained: Some(answer),
            companies_insured: Some(answer),
            start_order_issued: Some(answer),
            documentary_maturity: DocumentaryMaturity::uniform(answer),
        }
    }
}

/// Questionnaire for a project taken over while works are under way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OngoingProjectCalibration {
    pub written_amendments: Option<CalibrationAnswer>,
    pub site_reports_distributed: Option<CalibrationAnswer>,
    pub disputes_under_control: Option<CalibrationAnswer>,
    pub payments_up_to_date: Option<CalibrationAnswer>,
    pub schedule_on_track: Option<CalibrationAnswer>,
    pub documentary_maturity: DocumentaryMaturity,
}

impl OngoingProjectCalibration {
    pub fn uniform(answer: CalibrationAnswer) -> Self {
        Self {
            written_amendments: Some(answer),
            site_reports_distributed: Some(answer),
            disputes_under_control: Some(answer),
            payments_up_to_date: Some(answer),
            schedule_on_track: Some(answer),
            documentary_maturity: DocumentaryMaturity::uniform(answer),
        }
    }
}

/// One-time questionnaire captured at project creation, keyed by project status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectCalibration {
    New(NewProjectCalibration),
    Ongoing(OngoingProjectCalibration),
}

impl ProjectCalibration {
    pub fn status(&self) -> ProjectStatus {
        match self {
            Self::New(_) => ProjectStatus::New,
            Self::Ongoing(_) => ProjectStatus::Ongoing,
        }
    }

    /// Questions relevant to this status paired with the recorded answer.
    pub fn answers(&self) -> Vec<(CalibrationQuestion, Option<CalibrationAnswer>)> {
        let (mut answers, documentary) = match self {
            Self::New(calibration) => (
                vec![
                    (SIGNED_MOE_CONTRACT, calibration.signed_moe_contract),
                    (DETAILED_PROGRAM, calibration.detailed_program),
                    (
                        BUDGET_VALIDATED_IN_WRITING,
                        calibration.budget_validated_in_writing,
                    ),
                    (BUILDING_PERMIT_OBTAINED, calibration.building_permit_obtained),
                    (COMPANIES_INSURED, calibration.companies_insured),
                    (START_ORDER_ISSUED, calibration.start_order_issued),
                ],
                &calibration.documentary_maturity,
            ),
            Self::Ongoing(calibration) => (
                vec![
                    (WRITTEN_AMENDMENTS, calibration.written_amendments),
                    (SITE_REPORTS_DISTRIBUTED, calibration.site_reports_distributed),
                    (DISPUTES_UNDER_CONTROL, calibration.disputes_under_control),
                    (PAYMENTS_UP_TO_DATE, calibration.payments_up_to_date),
                    (SCHEDULE_ON_TRACK, calibration.schedule_on_track),
                ],
                &calibration.documentary_maturity,
            ),
        };
        answers.extend(documentary.answers());
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_costs_half_the_penalty_rounded_down() {
        assert_eq!(SIGNED_MOE_CONTRACT.points(CalibrationAnswer::Unknown), -5);
        assert_eq!(DISPUTES_UNDER_CONTROL.points(CalibrationAnswer::Unknown), -4);

        let odd = CalibrationQuestion {
            no_penalty: 5,
            ..START_ORDER_ISSUED
        };
        assert_eq!(odd.points(CalibrationAnswer::Unknown), -3);
    }

    #[test]
    fn answers_follow_the_status_question_set() {
        let new = ProjectCalibration::New(NewProjectCalibration::default());
        let ongoing = ProjectCalibration::Ongoing(OngoingProjectCalibration::default());

        assert_eq!(new.answers().len(), 8);
        assert_eq!(ongoing.answers().len(), 7);
        assert!(new
            .answers()
            .iter()
            .all(|(question, _)| question.category != CalibrationCategory::OngoingRisk));
        assert!(ongoing
            .answers()
            .iter()
            .all(|(question, _)| question.category != CalibrationCategory::SiteStart));
    }

    #[test]
    fn calibration_is_tagged_by_status() {
        let payload = serde_json::json!({
            "status": "ongoing",
            "written_amendments": "no",
            "documentary_maturity": { "proofs_archived": "yes" }
        });

        let calibration: ProjectCalibration =
            serde_json::from_value(payload).expect("calibration parses");

        assert_eq!(calibration.status(), ProjectStatus::Ongoing);
        match calibration {
            ProjectCalibration::Ongoing(answers) => {
                assert_eq!(answers.written_amendments, Some(CalibrationAnswer::No));
                assert_eq!(answers.schedule_on_track, None);
                assert_eq!(
                    answers.documentary_maturity.proofs_archived,
                    Some(CalibrationAnswer::Yes)
                );
            }
            other => panic!("expected ongoing calibration, got {other:?}"),
        }
    }
}
