//! Contract, amendment and progress-billing arithmetic.

use serde::Serialize;

use super::domain::{Company, CompanyId, Decision, PaymentApplication, Project};

/// Statutory holdback on progress payments.
pub const RETENUE_GARANTIE_PERCENT: f64 = 5.0;

impl PaymentApplication {
    /// Amount held back under the retenue de garantie, if flagged.
    pub fn retenue_amount(&self) -> f64 {
        if self.has_retenue_garantie {
            self.validated_amount * RETENUE_GARANTIE_PERCENT / 100.0
        } else {
            0.0
        }
    }

    pub fn net_amount(&self) -> f64 {
        self.validated_amount - self.retenue_amount()
    }
}

/// Base contract plus every financial decision linked to the company.
pub fn company_contract_total(company: &Company, decisions: &[Decision]) -> f64 {
    company.contract_amount + company_amendments_total(&company.id, decisions)
}

pub fn company_amendments_total(company_id: &CompanyId, decisions: &[Decision]) -> f64 {
    decisions
        .iter()
        .filter(|decision| decision.is_linked_to(company_id))
        .map(Decision::financial_amount)
        .sum()
}

/// Latest validated or paid application for a company, by highest sequence number.
pub fn latest_settled_payment<'a>(
    company_id: &CompanyId,
    payments: &'a [PaymentApplication],
) -> Option<&'a PaymentApplication> {
    payments
        .iter()
        .filter(|payment| &payment.company_id == company_id && payment.status.is_settled())
        .max_by_key(|payment| payment.number)
}

/// Share of `part` in `total`, guarded against empty totals.
pub fn progress_percent(part: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() {
        part / total * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyFinancialLine {
    pub company_id: CompanyId,
    pub name: String,
    pub trade: String,
    pub base_amount: f64,
    pub amendments_total: f64,
    pub contract_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_payment_number: Option<u32>,
    pub validated_to_date: f64,
    pub retenue_amount: f64,
    pub net_amount: f64,
    pub progress_pct: f64,
}

/// Project-wide contract totals against validated progress billing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialProgress {
    pub contract_total: f64,
    pub amendments_total: f64,
    pub validated_total: f64,
    pub retenue_total: f64,
    pub net_total: f64,
    pub progress_pct: f64,
    pub companies: Vec<CompanyFinancialLine>,
}

impl FinancialProgress {
    pub fn for_project(project: &Project) -> Self {
        let companies: Vec<CompanyFinancialLine> = project
            .companies
            .iter()
            .map(|company| company_line(company, project))
            .collect();

        let contract_total = companies.iter().map(|line| line.contract_total).sum();
        let amendments_total = companies.iter().map(|line| line.amendments_total).sum();
        let validated_total = companies.iter().map(|line| line.validated_to_date).sum();
        let retenue_total = companies.iter().map(|line| line.retenue_amount).sum();
        let net_total = companies.iter().map(|line| line.net_amount).sum();

        Self {
            contract_total,
            amendments_total,
            validated_total,
            retenue_total,
            net_total,
            progress_pct: progress_percent(validated_total, contract_total),
            companies,
        }
    }
}

fn company_line(company: &Company, project: &Project) -> CompanyFinancialLine {
    let amendments_total = company_amendments_total(&company.id, project.decisions());
    let contract_total = company.contract_amount + amendments_total;
    let latest = latest_settled_payment(&company.id, &project.payment_applications);
    let validated_to_date = latest.map(|payment| payment.validated_amount).unwrap_or(0.0);

    CompanyFinancialLine {
        company_id: company.id.clone(),
        name: company.name.clone(),
        trade: company.trade.clone(),
        base_amount: company.contract_amount,
        amendments_total,
        contract_total,
        latest_payment_number: latest.map(|payment| payment.number),
        validated_to_date,
        retenue_amount: latest.map(PaymentApplication::retenue_amount).unwrap_or(0.0),
        net_amount: latest.map(PaymentApplication::net_amount).unwrap_or(0.0),
        progress_pct: progress_percent(validated_to_date, contract_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::domain::{DecisionId, DecisionType, PaymentId, PaymentStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn company(id: &str, amount: f64) -> Company {
        Company {
            id: CompanyId(id.to_string()),
            name: format!("Company {id}"),
            trade: "Masonry".to_string(),
            contract_amount: amount,
        }
    }

    fn financial_decision(id: &str, company: Option<&str>, amount: f64, flagged: bool) -> Decision {
        Decision {
            id: DecisionId(id.to_string()),
            title: "Avenant".to_string(),
            description: None,
            decision_type: DecisionType::Financial,
            decided_on: NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date"),
            company_id: company.map(|id| CompanyId(id.to_string())),
            has_written_validation: true,
            has_proof_attached: true,
            has_financial_impact: flagged,
            amount: Some(amount),
            score_impact: 7,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
        }
    }

    fn payment(company: &str, number: u32, amount: f64, status: PaymentStatus) -> PaymentApplication {
        PaymentApplication {
            id: PaymentId(format!("pay-{company}-{number}")),
            company_id: CompanyId(company.to_string()),
            number,
            period_end: NaiveDate::from_ymd_opt(2025, number, 28).expect("valid date"),
            validated_amount: amount,
            has_retenue_garantie: false,
            status,
        }
    }

    #[test]
    fn contract_total_includes_only_linked_financial_decisions() {
        let masonry = company("masonry", 10_000.0);
        let decisions = vec![
            financial_decision("d1", Some("masonry"), 2_000.0, true),
            financial_decision("d2", Some("roofing"), 5_000.0, true),
            financial_decision("d3", None, 700.0, true),
            financial_decision("d4", Some("masonry"), 900.0, false),
        ];

        assert_eq!(company_contract_total(&masonry, &decisions), 12_000.0);
    }

    #[test]
    fn retenue_withholds_five_percent_when_flagged() {
        let mut application = payment("masonry", 1, 1_000.0, PaymentStatus::Validated);
        assert_eq!(application.retenue_amount(), 0.0);
        assert_eq!(application.net_amount(), 1_000.0);

        application.has_retenue_garantie = true;
        assert_eq!(application.retenue_amount(), 50.0);
        assert_eq!(application.net_amount(), 950.0);
    }

    #[test]
    fn latest_payment_is_highest_settled_number() {
        let payments = vec![
            payment("masonry", 1, 3_000.0, PaymentStatus::Paid),
            payment("masonry", 3, 6_000.0, PaymentStatus::Submitted),
            payment("masonry", 2, 4_500.0, PaymentStatus::Validated),
            payment("roofing", 4, 9_000.0, PaymentStatus::Paid),
        ];

        let latest = latest_settled_payment(&CompanyId("masonry".to_string()), &payments)
            .expect("settled payment present");
        assert_eq!(latest.number, 2);
        assert_eq!(latest.validated_amount, 4_500.0);

        assert!(latest_settled_payment(&CompanyId("plumbing".to_string()), &payments).is_none());
    }

    #[test]
    fn progress_percent_guards_zero_totals() {
        assert_eq!(progress_percent(500.0, 0.0), 0.0);
        assert_eq!(progress_percent(250.0, 1_000.0), 25.0);
    }
}
