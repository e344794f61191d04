use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_RATING_MIN: f64 = 1.0;
pub(crate) const DEFAULT_RATING_MAX: f64 = 5.0;

/// Identifier wrapper for applications under review.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for the staff member filling in a scorecard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewerId(pub String);

/// Kinds of scorecard fields staff can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Rating,
    Text,
    LongText,
    YesNo,
}

impl FieldKind {
    /// Whether values of this kind feed the numeric aggregates.
    pub const fn is_aggregated(self) -> bool {
        match self {
            FieldKind::Rating => true,
            FieldKind::Text | FieldKind::LongText | FieldKind::YesNo => false,
        }
    }
}

/// One configured scorecard question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ScorecardField {
    pub fn min_or_default(&self) -> f64 {
        self.min.unwrap_or(DEFAULT_RATING_MIN)
    }

    pub fn max_or_default(&self) -> f64 {
        self.max.unwrap_or(DEFAULT_RATING_MAX)
    }
}

/// Ordered field list staff evaluate applicants against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorecardConfig {
    pub fields: Vec<ScorecardField>,
}

impl ScorecardConfig {
    pub fn new(fields: Vec<ScorecardField>) -> Self {
        Self { fields }
    }

    /// Rating fields in configuration order.
    pub fn rating_fields(&self) -> impl Iterator<Item = &ScorecardField> {
        self.fields.iter().filter(|field| field.kind.is_aggregated())
    }

    pub fn field(&self, id: &str) -> Option<&ScorecardField> {
        self.fields.iter().find(|field| field.id == id)
    }
}

/// A single submitted answer. Only `Number` participates in aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScorecardValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl ScorecardValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScorecardValue::Number(value) => Some(*value),
            ScorecardValue::Flag(_) | ScorecardValue::Text(_) | ScorecardValue::Other(_) => None,
        }
    }
}

impl From<f64> for ScorecardValue {
    fn from(value: f64) -> Self {
        ScorecardValue::Number(value)
    }
}

impl From<&str> for ScorecardValue {
    fn from(value: &str) -> Self {
        ScorecardValue::Text(value.to_string())
    }
}

/// Answers keyed by field id.
pub type ScorecardData = BTreeMap<String, ScorecardValue>;

/// One reviewer's scorecard for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardSubmission {
    pub application_id: ApplicationId,
    pub reviewer_id: ReviewerId,
    pub data: ScorecardData,
    pub submitted_at: DateTime<Utc>,
}

/// Portal roles as resolved by the upstream session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalRole {
    Applicant,
    Staff,
    Admin,
}

impl PortalRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "applicant" => Some(Self::Applicant),
            "staff" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PortalRole::Applicant => "applicant",
            PortalRole::Staff => "staff",
            PortalRole::Admin => "admin",
        }
    }

    /// Admins inherit every staff permission.
    pub fn satisfies(self, required: PortalRole) -> bool {
        self >= required
    }
}

/// Already-authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: ReviewerId,
    pub role: PortalRole,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: PortalRole) -> Self {
        Self {
            id: ReviewerId(id.into()),
            role,
        }
    }
}
