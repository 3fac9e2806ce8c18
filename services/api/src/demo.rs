use crate::infra::{parse_date, parse_project_type, InMemoryProjectRepository};
use chantier_trace::error::AppError;
use chantier_trace::projects::{
    preview_initial_score, CalibrationAnswer, CompanyDraft, DecisionDraft, DecisionType,
    InitialScoreBreakdown, NewProjectCalibration, PaymentApplicationDraft, PaymentStatus, Project,
    ProjectCalibration, ProjectDraft, ProjectRepository, ProjectService, ProjectServiceError,
    ProjectType, SiteReportDraft, SnagDraft,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Project type: individual, renovation or tertiary
    #[arg(long, value_parser = parse_project_type)]
    pub(crate) project_type: ProjectType,
    /// JSON file holding the calibration answers, tagged by `status`
    #[arg(long)]
    pub(crate) calibration: PathBuf,
    /// Print the breakdown as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// List every decision with its impact.
    #[arg(long)]
    pub(crate) list_decisions: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        project_type,
        calibration,
        json,
    } = args;

    let raw = std::fs::read_to_string(&calibration)?;
    let calibration: ProjectCalibration = serde_json::from_str(&raw)?;
    let breakdown = preview_initial_score(project_type, &calibration);

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        render_breakdown(&breakdown);
    }
    Ok(())
}

fn render_breakdown(breakdown: &InitialScoreBreakdown) {
    println!(
        "Initial score for a {} {} project",
        breakdown.status.label(),
        breakdown.project_type.label()
    );
    println!("- Status base: {}", breakdown.base);
    println!("- Project type modifier: {:+}", breakdown.type_modifier);
    for component in &breakdown.components {
        println!(
            "  - [{}] {} = {} ({:+})",
            component.category.label(),
            component.question,
            component.answer.label(),
            component.points
        );
    }
    println!(
        "Total {} -> score {} ({} risk)",
        breakdown.raw_total,
        breakdown.score,
        breakdown.risk_level.label()
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        list_decisions,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Chantier Trace demo");
    let service = ProjectService::new(Arc::new(InMemoryProjectRepository::default()));
    let project = seed_demo_project(&service, today)?;

    println!(
        "\nProject {} ({}, {})",
        project.name,
        project.status().label(),
        project.project_type.label()
    );
    println!(
        "- Initial score {} | current score {} ({} risk)",
        project.initial_score(),
        project.current_score(),
        project.current_risk_level().label()
    );
    println!(
        "- {} decisions | {} companies | {} site reports | {} open snags",
        project.decisions().len(),
        project.companies.len(),
        project.site_reports.len(),
        project.open_snag_count()
    );

    if list_decisions {
        println!("\nDecisions");
        for decision in project.decisions() {
            println!(
                "  - {} [{}] {} -> {:+}",
                decision.decided_on,
                decision.decision_type.label(),
                decision.title,
                decision.score_impact()
            );
        }
    }

    println!("\nScore timeline");
    for point in service.score_timeline(&project.id)? {
        println!(
            "  - {} {:+} -> {} ({})",
            point.decided_on,
            point.score_impact,
            point.score,
            point.risk_level.label()
        );
    }

    let problematic = service.problematic_decisions(&project.id)?;
    if problematic.is_empty() {
        println!("\nNo undocumented decisions");
    } else {
        println!("\nDecisions to document");
        for decision in problematic {
            println!("  - {} ({:+})", decision.title, decision.score_impact());
        }
    }

    let finance = service.financial_progress(&project.id)?;
    println!("\nFinancial progress");
    for line in &finance.companies {
        println!(
            "  - {} ({}): contract {:.2} incl. {:.2} amendments | validated {:.2} | retenue {:.2} | {:.1}%",
            line.name,
            line.trade,
            line.contract_total,
            line.amendments_total,
            line.validated_to_date,
            line.retenue_amount,
            line.progress_pct
        );
    }
    println!(
        "  Total: {:.2} validated of {:.2} ({:.1}%), net {:.2}",
        finance.validated_total, finance.contract_total, finance.progress_pct, finance.net_total
    );

    let dashboard = service.dashboard()?;
    println!("\nPortfolio");
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}

/// Register a sample renovation with decisions, trades, a visit, a snag and billing.
pub(crate) fn seed_demo_project<R>(
    service: &ProjectService<R>,
    today: NaiveDate,
) -> Result<Project, ProjectServiceError>
where
    R: ProjectRepository + 'static,
{
    let mut calibration = NewProjectCalibration::uniform(CalibrationAnswer::Yes);
    calibration.building_permit_obtained = Some(CalibrationAnswer::Unknown);
    calibration.documentary_maturity.proofs_archived = Some(CalibrationAnswer::No);

    let project = service.create_project(ProjectDraft {
        name: "Rénovation maison de bourg".to_string(),
        client: Some("M. et Mme Caron".to_string()),
        address: Some("4 place de l'Église, Clisson".to_string()),
        project_type: ProjectType::Renovation,
        calibration: ProjectCalibration::New(calibration),
    })?;
    let started = today - Duration::days(60);

    let masonry = service.add_company(
        &project.id,
        CompanyDraft {
            name: "Maçonnerie Guillet".to_string(),
            trade: "Gros œuvre".to_string(),
            contract_amount: 42_000.0,
        },
    )?;
    let joinery = service.add_company(
        &project.id,
        CompanyDraft {
            name: "Menuiseries Baudry".to_string(),
            trade: "Menuiseries extérieures".to_string(),
            contract_amount: 18_500.0,
        },
    )?;

    let decisions = [
        DecisionDraft {
            title: "Validation des plans d'exécution".to_string(),
            description: None,
            decision_type: DecisionType::Validation,
            decided_on: started,
            company_id: None,
            has_written_validation: true,
            has_proof_attached: true,
            has_financial_impact: false,
            amount: None,
        },
        DecisionDraft {
            title: "Reprise en sous-œuvre du pignon".to_string(),
            description: Some("Fondations plus faibles que prévu".to_string()),
            decision_type: DecisionType::Financial,
            decided_on: started + Duration::days(12),
            company_id: Some(masonry.id.clone()),
            has_written_validation: true,
            has_proof_attached: true,
            has_financial_impact: true,
            amount: Some(6_800.0),
        },
        DecisionDraft {
            title: "Changement de teinte des menuiseries".to_string(),
            description: None,
            decision_type: DecisionType::Modification,
            decided_on: started + Duration::days(25),
            company_id: Some(joinery.id.clone()),
            has_written_validation: false,
            has_proof_attached: false,
            has_financial_impact: false,
            amount: None,
        },
        DecisionDraft {
            title: "Alerte sur le séchage des enduits".to_string(),
            description: None,
            decision_type: DecisionType::Counsel,
            decided_on: started + Duration::days(40),
            company_id: Some(masonry.id.clone()),
            has_written_validation: true,
            has_proof_attached: false,
            has_financial_impact: false,
            amount: None,
        },
    ];
    for draft in decisions {
        service.add_decision(&project.id, draft)?;
    }

    service.add_site_report(
        &project.id,
        SiteReportDraft {
            visited_on: started + Duration::days(41),
            attendees: vec![
                "Maître d'œuvre".to_string(),
                "Maçonnerie Guillet".to_string(),
            ],
            observations: "Enduits à reprendre côté nord, pignon conforme".to_string(),
            weather: Some("Couvert".to_string()),
        },
    )?;

    let snag = service.add_snag(
        &project.id,
        SnagDraft {
            description: "Appui de fenêtre fissuré".to_string(),
            location: Some("Chambre 2".to_string()),
            company_id: Some(joinery.id.clone()),
            reported_on: started + Duration::days(41),
        },
    )?;
    service.add_snag(
        &project.id,
        SnagDraft {
            description: "Joint de dallage manquant".to_string(),
            location: Some("Terrasse".to_string()),
            company_id: Some(masonry.id.clone()),
            reported_on: started + Duration::days(41),
        },
    )?;
    service.toggle_snag(&project.id, &snag.id, today)?;

    let first = service.add_payment_application(
        &project.id,
        PaymentApplicationDraft {
            company_id: masonry.id.clone(),
            number: 1,
            period_end: started + Duration::days(30),
            validated_amount: 15_000.0,
            has_retenue_garantie: true,
        },
    )?;
    for step in [
        PaymentStatus::Submitted,
        PaymentStatus::Validated,
        PaymentStatus::Paid,
    ] {
        service.transition_payment(&project.id, &first.id, step)?;
    }
    let second = service.add_payment_application(
        &project.id,
        PaymentApplicationDraft {
            company_id: masonry.id,
            number: 2,
            period_end: started + Duration::days(58),
            validated_amount: 27_500.0,
            has_retenue_garantie: true,
        },
    )?;
    service.transition_payment(&project.id, &second.id, PaymentStatus::Submitted)?;
    service.transition_payment(&project.id, &second.id, PaymentStatus::Validated)?;

    service.get(&project.id)
}
