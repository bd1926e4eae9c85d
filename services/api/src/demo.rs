use crate::infra::{build_review_stack, parse_analyzer, ApiReviewService};
use clap::Args;
use firesafe_review::config::{AnalyzerKind, AppConfig, ReviewConfig};
use firesafe_review::error::AppError;
use firesafe_review::workflows::review::{
    BuildingProfile, ComplianceState, DrawingUpload, IssueRecord, ProjectSubmission,
    ReviewOutcome, RuleCatalog, Severity, SiteLocation, UserId,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding a project submission
    #[arg(long)]
    pub(crate) project: PathBuf,
    /// Analyzer to use: none, heuristic or simulated (defaults to FIRESAFE_ANALYZER)
    #[arg(long, value_parser = parse_analyzer)]
    pub(crate) analyzer: Option<AnalyzerKind>,
    /// Seed for the simulated analyzer
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Exact category name, e.g. "المخارج والمداخل"
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Building use the rules must apply to, e.g. "تجاري"
    #[arg(long)]
    pub(crate) building_type: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Analyzer to use: none, heuristic or simulated (defaults to heuristic)
    #[arg(long, value_parser = parse_analyzer)]
    pub(crate) analyzer: Option<AnalyzerKind>,
    /// Seed for the simulated analyzer (defaults to 2021)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

/// One-shot review config: always in memory, analyzer overridable.
fn cli_review_config(
    analyzer: Option<AnalyzerKind>,
    seed: Option<u64>,
) -> Result<ReviewConfig, AppError> {
    let mut review = AppConfig::load()?.review;
    review.data_dir = None;
    if let Some(kind) = analyzer {
        review.analyzer = kind;
    }
    if seed.is_some() {
        review.simulation_seed = seed;
    }
    Ok(review)
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        project,
        analyzer,
        seed,
    } = args;

    let bytes = std::fs::read(&project)?;
    let submission: ProjectSubmission =
        serde_json::from_slice(&bytes).map_err(std::io::Error::from)?;

    let stack = build_review_stack(&cli_review_config(analyzer, seed)?)?;
    let created = stack.service.submit(submission)?;
    let outcome = stack.service.evaluate(&created.id).await?;

    println!("Project: {} ({})", created.project_name, created.id);
    println!("Analyzer: {}", stack.service.analyzer_name());
    render_outcome(&outcome);
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let catalog = RuleCatalog::builtin()?;
    let rules: Vec<_> = catalog
        .all()
        .iter()
        .filter(|rule| {
            args.category
                .as_deref()
                .map_or(true, |category| rule.category == category)
        })
        .filter(|rule| {
            args.building_type
                .as_deref()
                .map_or(true, |building_type| rule.applies_to(building_type))
        })
        .collect();

    println!(
        "{} {} | {} rule(s)",
        catalog.code(),
        catalog.version(),
        rules.len()
    );
    for rule in rules {
        println!(
            "- [{}] {} {} ({}) | {}",
            rule.severity.label(),
            rule.id,
            rule.rule_number,
            rule.category,
            rule.title
        );
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let review = ReviewConfig {
        analyzer: args.analyzer.unwrap_or(AnalyzerKind::Heuristic),
        simulation_seed: Some(args.seed.unwrap_or(2021)),
        ..ReviewConfig::default()
    };
    let stack = build_review_stack(&review)?;
    let service = stack.service;

    println!("Fire-safety review demo ({})", service.analyzer_name());

    let complete = demo_submission(
        "برج النيل الإداري",
        &[
            ("architectural_plan.pdf", "application/pdf", 1_800_000),
            ("fire_alarm_system.dwg", "application/acad", 950_000),
            ("emergency_exits.dwg", "application/acad", 720_000),
            ("sprinkler_layout.dwg", "application/acad", 640_000),
            ("hydrant_network.pdf", "application/pdf", 410_000),
        ],
    );
    let photos = demo_submission(
        "مول المعادي",
        &[("site_photo.jpg", "image/jpeg", 30_000)],
    );
    let empty = demo_submission("مخزن العبور", &[]);

    for submission in [complete, photos, empty] {
        let created = service.submit(submission)?;
        println!("\n== {} ({})", created.project_name, created.id);
        let outcome = service.evaluate(&created.id).await?;
        render_outcome(&outcome);
    }

    manual_review_walkthrough(&service)?;

    let stats = service.applicant_stats(&demo_applicant())?;
    println!(
        "\nApplicant dashboard: {} total | {} approved | {} needs revision | {} rejected | {} pending",
        stats.total, stats.approved, stats.needs_revision, stats.rejected, stats.pending
    );
    println!(
        "Unread notifications: {}",
        stack.notifications.unread_count(&demo_applicant())
    );
    Ok(())
}

/// Manual reviewer pass over the first drawing of the image-only project.
fn manual_review_walkthrough(service: &ApiReviewService) -> Result<(), AppError> {
    let projects = service.projects_for(&demo_applicant())?;
    let Some(project) = projects
        .iter()
        .find(|project| project.project_name == "مول المعادي")
    else {
        return Ok(());
    };
    let Some(drawing) = project.drawings.first() else {
        return Ok(());
    };

    let issues = vec![
        IssueRecord::non_compliant(
            "rule-004",
            Severity::Major,
            "عرض ممر الهروب أقل من الحد الأدنى",
            Some("زيادة عرض الممر إلى 1.2 متر على الأقل".to_string()),
        ),
        IssueRecord::non_compliant(
            "rule-008",
            Severity::Minor,
            "لافتات الخروج غير موضحة",
            None,
        ),
        IssueRecord {
            rule_id: "rule-011".to_string(),
            status: ComplianceState::Compliant,
            notes: "نظام الإنذار مطابق".to_string(),
            severity: Severity::Critical,
            suggested_fix: None,
        },
    ];
    let reviewed = service.review_drawing(&drawing.id, issues)?;
    println!(
        "\nManual review of {}: {}",
        reviewed.file_name,
        reviewed.status.label()
    );

    let report = service.create_review_report(&project.id, &UserId("reviewer-003".to_string()))?;
    println!(
        "Manual report {}: {} ({}%)",
        report.id,
        report.overall_status.label(),
        report.compliance_score
    );
    for line in &report.recommendations {
        println!("  - {line}");
    }
    Ok(())
}

fn render_outcome(outcome: &ReviewOutcome) {
    println!(
        "Score: {}% | Status: {}{}",
        outcome.score,
        outcome.status.label(),
        if outcome.degraded {
            " (basic verification only)"
        } else {
            ""
        }
    );
    println!(
        "Issues: {} critical | {} major | {} minor",
        outcome.report.counts.critical_issues,
        outcome.report.counts.major_issues,
        outcome.report.counts.minor_issues
    );
    println!("Reasons:");
    for reason in &outcome.reasons {
        println!("  - {reason}");
    }
    println!("Recommendations:");
    for line in &outcome.report.recommendations {
        println!("  - {line}");
    }
    if let Some(license) = &outcome.license {
        println!(
            "License: {} (valid until {})",
            license.license_number,
            license.expires_at.format("%Y-%m-%d")
        );
    }
    if let Some(warning) = &outcome.persistence_warning {
        println!("Warning: review not saved ({warning})");
    }
}

fn demo_applicant() -> UserId {
    UserId("applicant-demo".to_string())
}

fn demo_submission(name: &str, drawings: &[(&str, &str, u64)]) -> ProjectSubmission {
    ProjectSubmission {
        applicant_id: demo_applicant(),
        project_name: name.to_string(),
        building: BuildingProfile {
            building_type: "تجاري".to_string(),
            area: 1500.0,
            floors: 5,
            height: Some(18.0),
            basement_floors: Some(1),
            parking_spaces: Some(40),
            total_occupancy: Some(320),
            occupancy_type: None,
            construction_type: Some("خرسانة مسلحة".to_string()),
        },
        location: SiteLocation {
            location: "القاهرة".to_string(),
            address: None,
            latitude: None,
            longitude: None,
        },
        drawings: drawings
            .iter()
            .map(|(file_name, file_type, file_size)| DrawingUpload {
                file_name: file_name.to_string(),
                file_type: file_type.to_string(),
                file_size: *file_size,
            })
            .collect(),
    }
}
