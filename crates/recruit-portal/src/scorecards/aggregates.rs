use serde::{Deserialize, Serialize};

use super::domain::{ScorecardConfig, ScorecardField, ScorecardSubmission};

/// Tolerance for treating a scaled value as sitting exactly on a half.
const MIDPOINT_TOLERANCE: f64 = 1e-9;

/// Summary statistics for one rating field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub field_id: String,
    pub field_label: String,
    pub average: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_average: Option<f64>,
}

/// Aggregates for every rating field plus the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateData {
    pub scores: Vec<AggregateScore>,
    pub total_submissions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_weighted_average: Option<f64>,
}

impl AggregateData {
    fn empty(total_submissions: usize) -> Self {
        Self {
            scores: Vec::new(),
            total_submissions,
            overall_weighted_average: None,
        }
    }
}

/// Round half away from zero at two decimal digits.
///
/// Decimal midpoints stored just below the half in binary (`2.005`) still
/// round up.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let scaled = value * 100.0;
    let fraction = scaled.abs().fract();
    let rounded = if (fraction - 0.5).abs() < MIDPOINT_TOLERANCE {
        scaled.trunc() + scaled.signum()
    } else {
        scaled.round()
    };

    rounded / 100.0
}

/// Aggregate reviewer submissions against the bound scorecard configuration.
///
/// Missing or non-numeric answers are skipped rather than counted as zero.
pub fn compute_aggregates(
    submissions: &[ScorecardSubmission],
    config: Option<&ScorecardConfig>,
) -> AggregateData {
    let total_submissions = submissions.len();

    let Some(config) = config else {
        return AggregateData::empty(total_submissions);
    };

    let rating_fields: Vec<&ScorecardField> = config.rating_fields().collect();
    // No submissions means no zero-count placeholders either.
    if submissions.is_empty() || rating_fields.is_empty() {
        return AggregateData::empty(total_submissions);
    }

    let scores: Vec<AggregateScore> = rating_fields
        .into_iter()
        .map(|field| score_field(field, submissions))
        .collect();

    let overall_weighted_average = overall_average(&scores);

    AggregateData {
        scores,
        total_submissions,
        overall_weighted_average,
    }
}

/// Composite rating only; `None` means nothing was rated, not a zero score.
pub fn compute_overall_rating(
    submissions: &[ScorecardSubmission],
    config: Option<&ScorecardConfig>,
) -> Option<f64> {
    compute_aggregates(submissions, config).overall_weighted_average
}

fn score_field(field: &ScorecardField, submissions: &[ScorecardSubmission]) -> AggregateScore {
    let values: Vec<f64> = submissions
        .iter()
        .filter_map(|submission| submission.data.get(&field.id))
        .filter_map(|value| value.as_number())
        .collect();

    let (average, weighted_average) = if values.is_empty() {
        (0.0, None)
    } else {
        let average = round2(values.iter().sum::<f64>() / values.len() as f64);
        let weighted_average = field.weight.map(|weight| round2(average * weight));
        (average, weighted_average)
    };

    AggregateScore {
        field_id: field.id.clone(),
        field_label: field.label.clone(),
        average,
        count: values.len(),
        min: field.min_or_default(),
        max: field.max_or_default(),
        weight: field.weight,
        weighted_average,
    }
}

/// Weighted mean of per-field averages; unweighted fields count as weight 1.
fn overall_average(scores: &[AggregateScore]) -> Option<f64> {
    let (weighted_sum, weights_total) = scores
        .iter()
        .filter(|score| score.count > 0)
        .fold((0.0_f64, 0.0_f64), |(sum, total), score| {
            let weight = score.weight.unwrap_or(1.0);
            (sum + score.average * weight, total + weight)
        });

    if weights_total == 0.0 {
        return None;
    }

    Some(round2(weighted_sum / weights_total))
}
