use serde::Serialize;

use super::domain::Project;
use super::finance::{progress_percent, FinancialProgress};
use super::scoring::{problematic_decisions, RiskLevel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

/// KPIs summed across every project of an organization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub project_count: usize,
    pub average_score: f64,
    pub risk_distribution: RiskDistribution,
    pub decision_count: usize,
    pub problematic_decision_count: usize,
    pub open_snag_count: usize,
    pub contract_total: f64,
    pub validated_total: f64,
    pub progress_pct: f64,
}

impl PortfolioSummary {
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut risk_distribution = RiskDistribution::default();
        let mut score_total = 0u64;
        let mut decision_count = 0;
        let mut problematic_decision_count = 0;
        let mut open_snag_count = 0;
        let mut contract_total = 0.0;
        let mut validated_total = 0.0;

        for project in projects {
            risk_distribution.record(project.current_risk_level());
            score_total += project.current_score() as u64;
            decision_count += project.decisions().len();
            problematic_decision_count += problematic_decisions(project.decisions()).len();
            open_snag_count += project.open_snag_count();

            let finance = FinancialProgress::for_project(project);
            contract_total += finance.contract_total;
            validated_total += finance.validated_total;
        }

        let average_score = if projects.is_empty() {
            0.0
        } else {
            score_total as f64 / projects.len() as f64
        };

        Self {
            project_count: projects.len(),
            average_score,
            risk_distribution,
            decision_count,
            problematic_decision_count,
            open_snag_count,
            contract_total,
            validated_total,
            progress_pct: progress_percent(validated_total, contract_total),
        }
    }
}
