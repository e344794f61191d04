use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregates::{compute_aggregates, AggregateData};
use super::domain::{
    ApplicationId, Caller, PortalRole, ScorecardConfig, ScorecardData, ScorecardSubmission,
};
use super::repository::{RepositoryError, ScorecardRepository, SubmissionOutcome};
use super::validation::{unknown_field, validate_config, ConfigViolation};

/// Ranked view of one application's composite rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub application_id: ApplicationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_rating: Option<f64>,
    pub total_submissions: usize,
}

/// Service composing the scorecard repository, config validation, and aggregation.
pub struct ScorecardService<R> {
    repository: Arc<R>,
}

impl<R> ScorecardService<R>
where
    R: ScorecardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Currently bound configuration, if any.
    pub fn config(
        &self,
        caller: &Caller,
    ) -> Result<Option<ScorecardConfig>, ScorecardServiceError> {
        authorize(caller, PortalRole::Staff)?;
        Ok(self.repository.load_config()?)
    }

    /// Validate and bind a new configuration. Admin only.
    pub fn replace_config(
        &self,
        caller: &Caller,
        config: ScorecardConfig,
    ) -> Result<ScorecardConfig, ScorecardServiceError> {
        authorize(caller, PortalRole::Admin)?;
        validate_config(&config)?;

        self.repository.store_config(config.clone())?;
        info!(
            admin = %caller.id.0,
            fields = config.fields.len(),
            rating_fields = config.rating_fields().count(),
            "scorecard configuration replaced"
        );
        Ok(config)
    }

    /// Record the caller's scorecard for an application.
    pub fn submit(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
        data: ScorecardData,
    ) -> Result<(ScorecardSubmission, SubmissionOutcome), ScorecardServiceError> {
        authorize(caller, PortalRole::Staff)?;

        if let Some(config) = self.repository.load_config()? {
            if let Some(field_id) = unknown_field(&config, &data) {
                return Err(ScorecardServiceError::UnknownField(field_id.to_string()));
            }
        }

        let submission = ScorecardSubmission {
            application_id,
            reviewer_id: caller.id.clone(),
            data,
            submitted_at: Utc::now(),
        };

        let outcome = self.repository.upsert_submission(submission.clone())?;
        info!(
            application = %submission.application_id.0,
            reviewer = %submission.reviewer_id.0,
            ?outcome,
            "scorecard submitted"
        );
        Ok((submission, outcome))
    }

    pub fn submissions(
        &self,
        caller: &Caller,
        application_id: &ApplicationId,
    ) -> Result<Vec<ScorecardSubmission>, ScorecardServiceError> {
        authorize(caller, PortalRole::Staff)?;
        Ok(self.repository.submissions_for(application_id)?)
    }

    /// Per-field and overall aggregates for one application.
    pub fn aggregate(
        &self,
        caller: &Caller,
        application_id: &ApplicationId,
    ) -> Result<AggregateData, ScorecardServiceError> {
        authorize(caller, PortalRole::Staff)?;
        let config = self.repository.load_config()?;
        let submissions = self.repository.submissions_for(application_id)?;

        let aggregates = compute_aggregates(&submissions, config.as_ref());
        debug!(
            application = %application_id.0,
            submissions = aggregates.total_submissions,
            overall = ?aggregates.overall_weighted_average,
            "scorecard aggregates computed"
        );
        Ok(aggregates)
    }

    pub fn overall_rating(
        &self,
        caller: &Caller,
        application_id: &ApplicationId,
    ) -> Result<Option<f64>, ScorecardServiceError> {
        Ok(self
            .aggregate(caller, application_id)?
            .overall_weighted_average)
    }

    /// Applications ordered by composite rating; unrated applications trail.
    pub fn ranking(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> Result<Vec<RankingEntry>, ScorecardServiceError> {
        authorize(caller, PortalRole::Staff)?;
        let config = self.repository.load_config()?;

        let mut entries = Vec::new();
        for application_id in self.repository.application_ids()? {
            let submissions = self.repository.submissions_for(&application_id)?;
            let aggregates = compute_aggregates(&submissions, config.as_ref());
            entries.push(RankingEntry {
                application_id,
                overall_rating: aggregates.overall_weighted_average,
                total_submissions: aggregates.total_submissions,
            });
        }

        entries.sort_by(compare_ranking);
        entries.truncate(limit);
        Ok(entries)
    }
}

fn compare_ranking(left: &RankingEntry, right: &RankingEntry) -> Ordering {
    let by_rating = match (left.overall_rating, right.overall_rating) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_rating.then_with(|| left.application_id.cmp(&right.application_id))
}

fn authorize(caller: &Caller, required: PortalRole) -> Result<(), ScorecardServiceError> {
    if caller.role.satisfies(required) {
        return Ok(());
    }

    warn!(
        caller = %caller.id.0,
        role = caller.role.label(),
        required = required.label(),
        "scorecard access denied"
    );
    Err(ScorecardServiceError::Forbidden { required })
}

/// Error raised by the scorecard service.
#[derive(Debug, thiserror::Error)]
pub enum ScorecardServiceError {
    #[error("{} role required", .required.label())]
    Forbidden { required: PortalRole },
    #[error(transparent)]
    InvalidConfig(#[from] ConfigViolation),
    #[error("field '{0}' is not part of the scorecard configuration")]
    UnknownField(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
