use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::scorecards::domain::{
    ApplicationId, Caller, FieldKind, PortalRole, ReviewerId, ScorecardConfig, ScorecardData,
    ScorecardField, ScorecardSubmission, ScorecardValue,
};
use crate::scorecards::repository::{RepositoryError, ScorecardRepository, SubmissionOutcome};
use crate::scorecards::{scorecard_router, ScorecardService};

pub(super) fn rating(id: &str, weight: Option<f64>) -> ScorecardField {
    ScorecardField {
        id: id.to_string(),
        label: format!("Rating {id}"),
        kind: FieldKind::Rating,
        min: Some(1.0),
        max: Some(5.0),
        weight,
    }
}

pub(super) fn text(id: &str) -> ScorecardField {
    ScorecardField {
        id: id.to_string(),
        label: format!("Notes {id}"),
        kind: FieldKind::LongText,
        min: None,
        max: None,
        weight: None,
    }
}

pub(super) fn config(fields: Vec<ScorecardField>) -> ScorecardConfig {
    ScorecardConfig::new(fields)
}

pub(super) fn data(entries: &[(&str, ScorecardValue)]) -> ScorecardData {
    entries
        .iter()
        .map(|(field_id, value)| (field_id.to_string(), value.clone()))
        .collect()
}

pub(super) fn submission(reviewer: &str, entries: &[(&str, ScorecardValue)]) -> ScorecardSubmission {
    ScorecardSubmission {
        application_id: ApplicationId("app-001".to_string()),
        reviewer_id: ReviewerId(reviewer.to_string()),
        data: data(entries),
        submitted_at: Utc
            .with_ymd_and_hms(2025, 3, 14, 18, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn num(value: f64) -> ScorecardValue {
    ScorecardValue::Number(value)
}

pub(super) fn staff() -> Caller {
    Caller::new("reviewer-ada", PortalRole::Staff)
}

pub(super) fn admin() -> Caller {
    Caller::new("admin-grace", PortalRole::Admin)
}

pub(super) fn applicant() -> Caller {
    Caller::new("applicant-linus", PortalRole::Applicant)
}

pub(super) fn interview_config() -> ScorecardConfig {
    config(vec![
        rating("communication", None),
        rating("technical", Some(3.0)),
        text("notes"),
    ])
}

pub(super) fn build_service() -> (ScorecardService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ScorecardService::new(repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    config: Arc<Mutex<Option<ScorecardConfig>>>,
    submissions: Arc<Mutex<BTreeMap<ApplicationId, Vec<ScorecardSubmission>>>>,
}

impl ScorecardRepository for MemoryRepository {
    fn load_config(&self) -> Result<Option<ScorecardConfig>, RepositoryError> {
        Ok(self.config.lock().expect("config mutex poisoned").clone())
    }

    fn store_config(&self, config: ScorecardConfig) -> Result<(), RepositoryError> {
        *self.config.lock().expect("config mutex poisoned") = Some(config);
        Ok(())
    }

    fn upsert_submission(
        &self,
        submission: ScorecardSubmission,
    ) -> Result<SubmissionOutcome, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
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
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.get(application_id).cloned().unwrap_or_default())
    }

    fn application_ids(&self) -> Result<Vec<ApplicationId>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.keys().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl ScorecardRepository for UnavailableRepository {
    fn load_config(&self) -> Result<Option<ScorecardConfig>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_config(&self, _config: ScorecardConfig) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_submission(
        &self,
        _submission: ScorecardSubmission,
    ) -> Result<SubmissionOutcome, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn submissions_for(
        &self,
        _application_id: &ApplicationId,
    ) -> Result<Vec<ScorecardSubmission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn application_ids(&self) -> Result<Vec<ApplicationId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: ScorecardService<MemoryRepository>) -> axum::Router {
    scorecard_router(Arc::new(service), 50)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
