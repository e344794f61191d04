//! Scorecard configuration, reviewer submissions, and the aggregation engine
//! behind sidebar previews, detail views, and applicant ranking.

pub mod aggregates;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use aggregates::{
    compute_aggregates, compute_overall_rating, round2, AggregateData, AggregateScore,
};
pub use domain::{
    ApplicationId, Caller, FieldKind, PortalRole, ReviewerId, ScorecardConfig, ScorecardData,
    ScorecardField, ScorecardSubmission, ScorecardValue,
};
pub use repository::{RepositoryError, ScorecardRepository, SubmissionOutcome};
pub use router::{scorecard_router, SubmitScorecardRequest, ROLE_HEADER, USER_HEADER};
pub use service::{RankingEntry, ScorecardService, ScorecardServiceError};
pub use validation::{validate_config, ConfigViolation};
