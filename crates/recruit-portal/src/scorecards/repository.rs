use super::domain::{ApplicationId, ScorecardConfig, ScorecardSubmission};

/// Whether an upsert created a new submission or replaced the reviewer's prior one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Created,
    Replaced,
}

/// Storage abstraction over the portal's document database.
pub trait ScorecardRepository: Send + Sync {
    fn load_config(&self) -> Result<Option<ScorecardConfig>, RepositoryError>;
    fn store_config(&self, config: ScorecardConfig) -> Result<(), RepositoryError>;
    /// Keyed by application and reviewer; a repeat submission replaces the earlier one.
    fn upsert_submission(
        &self,
        submission: ScorecardSubmission,
    ) -> Result<SubmissionOutcome, RepositoryError>;
    fn submissions_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<ScorecardSubmission>, RepositoryError>;
    /// Applications with at least one submission.
    fn application_ids(&self) -> Result<Vec<ApplicationId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
