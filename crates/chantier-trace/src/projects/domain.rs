use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calibration::ProjectCalibration;
use super::scoring::{self, RiskLevel};

/// Identifier wrapper for projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteReportId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnagId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

macro_rules! display_id {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

display_id!(ProjectId, DecisionId, CompanyId, SiteReportId, SnagId, PaymentId);

/// Lifecycle position of the project when it was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    New,
    Ongoing,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Ongoing => "ongoing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Individual,
    Renovation,
    Tertiary,
}

impl ProjectType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Renovation => "renovation",
            Self::Tertiary => "tertiary",
        }
    }
}

/// Nature of a logged decision. Counsel covers the alerts the supervisor raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Modification,
    Validation,
    #[serde(alias = "alert")]
    Counsel,
    Financial,
    Reception,
}

impl DecisionType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Modification,
            Self::Validation,
            Self::Counsel,
            Self::Financial,
            Self::Reception,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Modification => "modification",
            Self::Validation => "validation",
            Self::Counsel => "counsel",
            Self::Financial => "financial",
            Self::Reception => "reception",
        }
    }
}

/// Inbound description of a decision before it is scored and appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub decision_type: DecisionType,
    pub decided_on: NaiveDate,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub has_written_validation: bool,
    #[serde(default)]
    pub has_proof_attached: bool,
    #[serde(default)]
    pub has_financial_impact: bool,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// A logged decision with its computed traceability impact.
///
/// The impact is always derived from the documentation flags, including when
/// a decision is read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DecisionRecord")]
pub struct Decision {
    pub id: DecisionId,
    pub title: String,
    pub description: Option<String>,
    pub decision_type: DecisionType,
    pub decided_on: NaiveDate,
    pub company_id: Option<CompanyId>,
    pub has_written_validation: bool,
    pub has_proof_attached: bool,
    pub has_financial_impact: bool,
    pub amount: Option<f64>,
    pub(crate) score_impact: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Stored shape of a decision; any serialized impact is discarded.
#[derive(Debug, Deserialize)]
struct DecisionRecord {
    id: DecisionId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    decision_type: DecisionType,
    decided_on: NaiveDate,
    #[serde(default)]
    company_id: Option<CompanyId>,
    has_written_validation: bool,
    has_proof_attached: bool,
    has_financial_impact: bool,
    #[serde(default)]
    amount: Option<f64>,
    recorded_at: DateTime<Utc>,
}

impl From<DecisionRecord> for Decision {
    fn from(record: DecisionRecord) -> Self {
        let draft = DecisionDraft {
            title: record.title,
            description: record.description,
            decision_type: record.decision_type,
            decided_on: record.decided_on,
            company_id: record.company_id,
            has_written_validation: record.has_written_validation,
            has_proof_attached: record.has_proof_attached,
            has_financial_impact: record.has_financial_impact,
            amount: record.amount,
        };
        Decision::from_draft(record.id, draft, record.recorded_at)
    }
}

impl Decision {
    pub fn from_draft(id: DecisionId, draft: DecisionDraft, recorded_at: DateTime<Utc>) -> Self {
        let score_impact = scoring::calculate_decision_impact(
            draft.decision_type,
            draft.has_written_validation,
            draft.has_proof_attached,
            draft.has_financial_impact,
        );

        Self {
            id,
            title: draft.title,
            description: draft.description,
            decision_type: draft.decision_type,
            decided_on: draft.decided_on,
            company_id: draft.company_id,
            has_written_validation: draft.has_written_validation,
            has_proof_attached: draft.has_proof_attached,
            has_financial_impact: draft.has_financial_impact,
            amount: draft.amount,
            score_impact,
            recorded_at,
        }
    }

    pub fn score_impact(&self) -> i32 {
        self.score_impact
    }

    /// Amount this decision adds to its company's contract, if any.
    pub fn financial_amount(&self) -> f64 {
        if self.has_financial_impact {
            self.amount.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    pub fn is_linked_to(&self, company_id: &CompanyId) -> bool {
        self.company_id.as_ref() == Some(company_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub trade: String,
    pub contract_amount: f64,
}

/// Contracted trade or subcontractor on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub trade: String,
    pub contract_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReportDraft {
    pub visited_on: NaiveDate,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub observations: String,
    #[serde(default)]
    pub weather: Option<String>,
}

/// Minutes of a site visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    pub id: SiteReportId,
    pub visited_on: NaiveDate,
    pub attendees: Vec<String>,
    pub observations: String,
    pub weather: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnagStatus {
    Open,
    Cleared,
}

impl SnagStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Cleared => "cleared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnagDraft {
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    pub reported_on: NaiveDate,
}

/// Punch-list defect recorded before handover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snag {
    pub id: SnagId,
    pub description: String,
    pub location: Option<String>,
    pub company_id: Option<CompanyId>,
    pub reported_on: NaiveDate,
    pub status: SnagStatus,
    pub cleared_on: Option<NaiveDate>,
}

impl Snag {
    /// Flip between open and cleared, stamping the clearance date.
    pub fn toggle(&mut self, today: NaiveDate) {
        match self.status {
            SnagStatus::Open => {
                self.status = SnagStatus::Cleared;
                self.cleared_on = Some(today);
            }
            SnagStatus::Cleared => {
                self.status = SnagStatus::Open;
                self.cleared_on = None;
            }
        }
    }
}

/// Progress-billing status; legal moves are checked by the service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Draft,
    Submitted,
    Validated,
    Rejected,
    Paid,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    pub const fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Submitted)
                | (Self::Submitted, Self::Validated)
                | (Self::Submitted, Self::Rejected)
                | (Self::Validated, Self::Paid)
        )
    }

    /// Whether the amount counts toward financial progress.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Validated | Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inbound payment application. New applications always start in
/// [`PaymentStatus::Draft`] and move through [`PaymentStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentApplicationDraft {
    pub company_id: CompanyId,
    pub number: u32,
    pub period_end: NaiveDate,
    pub validated_amount: f64,
    #[serde(default)]
    pub has_retenue_garantie: bool,
}

/// Numbered progress-billing snapshot for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentApplication {
    pub id: PaymentId,
    pub company_id: CompanyId,
    pub number: u32,
    pub period_end: NaiveDate,
    pub validated_amount: f64,
    pub has_retenue_garantie: bool,
    pub status: PaymentStatus,
}

/// Inbound payload registering a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub project_type: ProjectType,
    pub calibration: ProjectCalibration,
}

/// Aggregate root for everything recorded on a construction project.
///
/// The initial score, decision list, current score and risk level are private:
/// the score only moves through [`Project::append_decision`], which reruns the
/// aggregator. Deserializing recomputes both scores from the calibration and
/// decisions and ignores any stored score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectRecord")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: Option<String>,
    pub address: Option<String>,
    pub project_type: ProjectType,
    calibration: ProjectCalibration,
    initial_score: u8,
    current_score: u8,
    current_risk_level: RiskLevel,
    decisions: Vec<Decision>,
    pub companies: Vec<Company>,
    pub site_reports: Vec<SiteReport>,
    pub snags: Vec<Snag>,
    pub payment_applications: Vec<PaymentApplication>,
    pub created_at: DateTime<Utc>,
    pub revision: u64,
}

impl Project {
    /// Build a project from its draft, fixing the initial score from the calibration.
    pub fn new(id: ProjectId, draft: ProjectDraft, created_at: DateTime<Utc>) -> Self {
        let initial_score =
            scoring::calculate_initial_score(draft.project_type, &draft.calibration);

        Self {
            id,
            name: draft.name,
            client: draft.client,
            address: draft.address,
            project_type: draft.project_type,
            calibration: draft.calibration,
            initial_score,
            current_score: initial_score,
            current_risk_level: RiskLevel::from_score(initial_score),
            decisions: Vec::new(),
            companies: Vec::new(),
            site_reports: Vec::new(),
            snags: Vec::new(),
            payment_applications: Vec::new(),
            created_at,
            revision: 0,
        }
    }

    pub fn status(&self) -> ProjectStatus {
        self.calibration.status()
    }

    pub fn calibration(&self) -> &ProjectCalibration {
        &self.calibration
    }

    pub fn initial_score(&self) -> u8 {
        self.initial_score
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn current_score(&self) -> u8 {
        self.current_score
    }

    pub fn current_risk_level(&self) -> RiskLevel {
        self.current_risk_level
    }

    /// Append a decision and recompute the score from the full decision list.
    pub fn append_decision(&mut self, decision: Decision) {
        self.decisions.push(decision);
        let score = scoring::calculate_project_score(self.initial_score, &self.decisions);
        self.current_score = score.score;
        self.current_risk_level = score.risk_level;
    }

    pub fn company(&self, id: &CompanyId) -> Option<&Company> {
        self.companies.iter().find(|company| &company.id == id)
    }

    pub fn snag_mut(&mut self, id: &SnagId) -> Option<&mut Snag> {
        self.snags.iter_mut().find(|snag| &snag.id == id)
    }

    pub fn payment_mut(&mut self, id: &PaymentId) -> Option<&mut PaymentApplication> {
        self.payment_applications
            .iter_mut()
            .find(|payment| &payment.id == id)
    }

    pub fn open_snag_count(&self) -> usize {
        self.snags
            .iter()
            .filter(|snag| snag.status == SnagStatus::Open)
            .count()
    }
}

/// Stored shape of a project; scores are rebuilt rather than trusted.
#[derive(Debug, Deserialize)]
struct ProjectRecord {
    id: ProjectId,
    name: String,
    #[serde(default)]
    client: Option<String>,
    #[serde(default)]
    address: Option<String>,
    project_type: ProjectType,
    calibration: ProjectCalibration,
    #[serde(default)]
    decisions: Vec<Decision>,
    #[serde(default)]
    companies: Vec<Company>,
    #[serde(default)]
    site_reports: Vec<SiteReport>,
    #[serde(default)]
    snags: Vec<Snag>,
    #[serde(default)]
    payment_applications: Vec<PaymentApplication>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    revision: u64,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let initial_score =
            scoring::calculate_initial_score(record.project_type, &record.calibration);
        let score = scoring::calculate_project_score(initial_score, &record.decisions);

        Self {
            id: record.id,
            name: record.name,
            client: record.client,
            address: record.address,
            project_type: record.project_type,
            calibration: record.calibration,
            initial_score,
            current_score: score.score,
            current_risk_level: score.risk_level,
            decisions: record.decisions,
            companies: record.companies,
            site_reports: record.site_reports,
            snags: record.snags,
            payment_applications: record.payment_applications,
            created_at: record.created_at,
            revision: record.revision,
        }
    }
}
