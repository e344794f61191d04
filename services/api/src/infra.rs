use metrics_exporter_prometheus::PrometheusHandle;
use recruit_portal::scorecards::{
    ApplicationId, RepositoryError, ScorecardConfig, ScorecardRepository, ScorecardSubmission,
    SubmissionOutcome,
};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the portal's document database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryScorecardRepository {
    config: Arc<Mutex<Option<ScorecardConfig>>>,
    submissions: Arc<Mutex<BTreeMap<ApplicationId, Vec<ScorecardSubmission>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

impl ScorecardRepository for InMemoryScorecardRepository {
    fn load_config(&self) -> Result<Option<ScorecardConfig>, RepositoryError> {
        Ok(lock(&self.config)?.clone())
    }

    fn store_config(&self, config: ScorecardConfig) -> Result<(), RepositoryError> {
        *lock(&self.config)? = Some(config);
        Ok(())
    }

    fn upsert_submission(
        &self,
        submission: ScorecardSubmission,
    ) -> Result<SubmissionOutcome, RepositoryError> {
        let mut guard = lock(&self.submissions)?;
        let entries = guard.entry(submission.application_id.clone()).or_default();
        match entries
            .iter_mut()
            .find(|existing| existing.reviewer_id == submission.reviewer_id)
        {
            Some(existing) => {
                *existing = submission;
                Ok(SubmissionOutcome::Replaced)
            }
            None => {
                entries.push(submission);
                Ok(SubmissionOutcome::Created)
            }
        }
    }

    fn submissions_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<ScorecardSubmission>, RepositoryError> {
        Ok(lock(&self.submissions)?
            .get(application_id)
            .cloned()
            .unwrap_or_default())
    }

    fn application_ids(&self) -> Result<Vec<ApplicationId>, RepositoryError> {
        Ok(lock(&self.submissions)?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recruit_portal::scorecards::{ReviewerId, ScorecardData};

    fn submission(application: &str, reviewer: &str) -> ScorecardSubmission {
        ScorecardSubmission {
            application_id: ApplicationId(application.to_string()),
            reviewer_id: ReviewerId(reviewer.to_string()),
            data: ScorecardData::new(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_replaces_per_reviewer() {
        let repository = InMemoryScorecardRepository::default();

        assert_eq!(
            repository.upsert_submission(submission("app-1", "ada")).unwrap(),
            SubmissionOutcome::Created
        );
        assert_eq!(
            repository.upsert_submission(submission("app-1", "grace")).unwrap(),
            SubmissionOutcome::Created
        );
        assert_eq!(
            repository.upsert_submission(submission("app-1", "ada")).unwrap(),
            SubmissionOutcome::Replaced
        );

        let stored = repository
            .submissions_for(&ApplicationId("app-1".to_string()))
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(
            repository.application_ids().unwrap(),
            vec![ApplicationId("app-1".to_string())]
        );
        assert!(repository
            .submissions_for(&ApplicationId("app-2".to_string()))
            .unwrap()
            .is_empty());
    }
}
