use crate::infra::InMemoryScorecardRepository;
use chrono::{DateTime, Utc};
use clap::Args;
use recruit_portal::error::AppError;
use recruit_portal::scorecards::{
    compute_aggregates, AggregateData, ApplicationId, Caller, FieldKind, PortalRole, ReviewerId,
    ScorecardConfig, ScorecardData, ScorecardField, ScorecardService, ScorecardSubmission,
    ScorecardValue,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug)]
pub(crate) struct AggregateArgs {
    /// JSON export containing `config` (or null) and `submissions`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print only the overall weighted average
    #[arg(long)]
    pub(crate) overall_only: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Maximum number of applications shown in the ranking
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
}

/// Offline export: the bound configuration plus raw reviewer answers.
#[derive(Debug, Deserialize)]
pub(crate) struct ScorecardExport {
    #[serde(default)]
    pub(crate) application_id: Option<String>,
    #[serde(default)]
    pub(crate) config: Option<ScorecardConfig>,
    #[serde(default)]
    pub(crate) submissions: Vec<ExportedSubmission>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedSubmission {
    #[serde(default)]
    pub(crate) reviewer_id: Option<String>,
    #[serde(default)]
    pub(crate) submitted_at: Option<DateTime<Utc>>,
    pub(crate) data: ScorecardData,
}

impl ScorecardExport {
    fn into_parts(self) -> (Option<ScorecardConfig>, Vec<ScorecardSubmission>) {
        let application_id = ApplicationId(
            self.application_id
                .unwrap_or_else(|| "exported-application".to_string()),
        );
        let submissions = self
            .submissions
            .into_iter()
            .enumerate()
            .map(|(index, exported)| ScorecardSubmission {
                application_id: application_id.clone(),
                reviewer_id: ReviewerId(
                    exported
                        .reviewer_id
                        .unwrap_or_else(|| format!("reviewer-{}", index + 1)),
                ),
                data: exported.data,
                submitted_at: exported.submitted_at.unwrap_or_else(Utc::now),
            })
            .collect();
        (self.config, submissions)
    }
}

pub(crate) fn aggregate_export(export: ScorecardExport) -> AggregateData {
    let (config, submissions) = export.into_parts();
    compute_aggregates(&submissions, config.as_ref())
}

pub(crate) fn run_aggregate(args: AggregateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let export: ScorecardExport = serde_json::from_str(&raw)?;
    debug!(
        input = %args.input.display(),
        submissions = export.submissions.len(),
        "aggregating scorecard export"
    );

    let aggregates = aggregate_export(export);
    if args.overall_only {
        match aggregates.overall_weighted_average {
            Some(overall) => println!("{overall:.2}"),
            None => println!("unrated"),
        }
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&aggregates)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = ScorecardService::new(Arc::new(InMemoryScorecardRepository::default()));
    let chair = Caller::new("membership-chair", PortalRole::Admin);
    let reviewers = [
        Caller::new("reviewer-ada", PortalRole::Staff),
        Caller::new("reviewer-grace", PortalRole::Staff),
    ];

    service.replace_config(&chair, demo_config())?;

    let sheets = [
        (
            "applicant-amara",
            [
                (Some(4.0), 5.0, "Led the hackathon team"),
                (Some(5.0), 4.0, "Clear communicator"),
            ],
        ),
        (
            "applicant-bo",
            [
                (Some(3.0), 4.0, "Quiet but thorough"),
                (None, 3.0, "Needs a second interview"),
            ],
        ),
        (
            "applicant-chidi",
            [
                (Some(2.0), 5.0, "Strong technically"),
                (Some(3.0), 5.0, "Great project portfolio"),
            ],
        ),
    ];

    for (applicant, answers) in sheets {
        for (reviewer, (motivation, technical, notes)) in reviewers.iter().zip(answers) {
            // An unanswered rating arrives as text and must not drag the average down.
            let motivation = motivation
                .map(ScorecardValue::Number)
                .unwrap_or_else(|| ScorecardValue::from("pending"));
            let mut data = ScorecardData::new();
            data.insert("motivation".to_string(), motivation);
            data.insert("technical".to_string(), ScorecardValue::Number(technical));
            data.insert("notes".to_string(), ScorecardValue::from(notes));
            service.submit(reviewer, ApplicationId(applicant.to_string()), data)?;
        }
    }

    println!("Scorecard aggregation demo");
    for (applicant, _) in sheets {
        let aggregates = service.aggregate(&chair, &ApplicationId(applicant.to_string()))?;
        println!(
            "\n{applicant} ({} submissions)",
            aggregates.total_submissions
        );
        for score in &aggregates.scores {
            let weighted = score
                .weighted_average
                .map(|value| format!(" | weighted {value:.2}"))
                .unwrap_or_default();
            println!(
                "  - {}: avg {:.2} from {} rating(s) on {}-{}{}",
                score.field_label, score.average, score.count, score.min, score.max, weighted
            );
        }
        match aggregates.overall_weighted_average {
            Some(overall) => println!("  Overall: {overall:.2}"),
            None => println!("  Overall: unrated"),
        }
    }

    println!("\nRanking (top {})", args.limit);
    for (position, entry) in service.ranking(&chair, args.limit)?.iter().enumerate() {
        let rating = entry
            .overall_rating
            .map(|value| format!("{value:.2}"))
            .unwrap_or_else(|| "unrated".to_string());
        println!(
            "  {}. {} -> {} ({} submissions)",
            position + 1,
            entry.application_id.0,
            rating,
            entry.total_submissions
        );
    }

    Ok(())
}

fn demo_config() -> ScorecardConfig {
    ScorecardConfig::new(vec![
        ScorecardField {
            id: "motivation".to_string(),
            label: "Motivation".to_string(),
            kind: FieldKind::Rating,
            min: Some(1.0),
            max: Some(5.0),
            weight: None,
        },
        ScorecardField {
            id: "technical".to_string(),
            label: "Technical depth".to_string(),
            kind: FieldKind::Rating,
            min: Some(1.0),
            max: Some(5.0),
            weight: Some(2.0),
        },
        ScorecardField {
            id: "notes".to_string(),
            label: "Interview notes".to_string(),
            kind: FieldKind::LongText,
            min: None,
            max: None,
            weight: None,
        },
    ])
}
