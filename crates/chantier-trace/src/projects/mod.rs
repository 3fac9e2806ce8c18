//! Project traceability: calibration, decisions, contracts, snags and billing.
//!
//! The scoring and financial modules are pure; the service threads them through
//! an injected [`ProjectRepository`] so storage stays swappable.

pub mod calibration;
pub mod dashboard;
pub mod domain;
pub mod finance;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use calibration::{
    CalibrationAnswer, CalibrationCategory, CalibrationQuestion, DocumentaryMaturity,
    NewProjectCalibration, OngoingProjectCalibration, ProjectCalibration,
};
pub use dashboard::{PortfolioSummary, RiskDistribution};
pub use domain::{
    Company, CompanyDraft, CompanyId, Decision, DecisionDraft, DecisionId, DecisionType,
    PaymentApplication, PaymentApplicationDraft, PaymentId, PaymentStatus, Project, ProjectDraft,
    ProjectId, ProjectStatus, ProjectType, SiteReport, SiteReportDraft, SiteReportId, Snag,
    SnagDraft, SnagId, SnagStatus,
};
pub use finance::{CompanyFinancialLine, FinancialProgress, RETENUE_GARANTIE_PERCENT};
pub use repository::{ProjectRepository, ProjectView, RepositoryError};
pub use router::{project_router, PaymentTransitionRequest};
pub use scoring::{InitialScoreBreakdown, ProjectScore, RiskLevel, ScorePoint};
pub use service::{preview_initial_score, DecisionReceipt, ProjectService, ProjectServiceError};
