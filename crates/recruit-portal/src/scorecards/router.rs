use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ApplicationId, Caller, PortalRole, ScorecardConfig, ScorecardData};
use super::repository::{ScorecardRepository, SubmissionOutcome};
use super::service::{ScorecardService, ScorecardServiceError};

/// Header carrying the verified user id from the upstream session layer.
pub const USER_HEADER: &str = "x-portal-user";
/// Header carrying the verified role from the upstream session layer.
pub const ROLE_HEADER: &str = "x-portal-role";

/// Shared handler state.
pub struct ScorecardState<R> {
    pub(crate) service: Arc<ScorecardService<R>>,
    pub(crate) ranking_limit: usize,
}

impl<R> Clone for ScorecardState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            ranking_limit: self.ranking_limit,
        }
    }
}

/// Body accepted when staff submit a scorecard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScorecardRequest {
    pub data: ScorecardData,
}

/// Router builder exposing scorecard configuration, submission, and aggregate endpoints.
pub fn scorecard_router<R>(service: Arc<ScorecardService<R>>, ranking_limit: usize) -> Router
where
    R: ScorecardRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/scorecards/config",
            get(config_handler::<R>).put(replace_config_handler::<R>),
        )
        .route("/api/v1/scorecards/ranking", get(ranking_handler::<R>))
        .route(
            "/api/v1/applications/:application_id/scorecards",
            get(submissions_handler::<R>).post(submit_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/scorecards/aggregate",
            get(aggregate_handler::<R>),
        )
        .with_state(ScorecardState {
            service,
            ranking_limit,
        })
}

/// Resolve the caller from headers the session layer has already verified.
pub(crate) fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    let id = headers
        .get(USER_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|id| !id.is_empty())?;
    let role = PortalRole::parse(headers.get(ROLE_HEADER)?.to_str().ok()?)?;
    Some(Caller::new(id, role))
}

fn unauthenticated() -> Response {
    let payload = json!({ "error": "missing or unrecognized portal identity" });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn error_response(error: ScorecardServiceError) -> Response {
    let status = match &error {
        ScorecardServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ScorecardServiceError::InvalidConfig(_) | ScorecardServiceError::UnknownField(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScorecardServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn config_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state.service.config(&caller) {
        Ok(Some(config)) => (StatusCode::OK, axum::Json(config)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no scorecard configuration bound" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_config_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
    axum::Json(config): axum::Json<ScorecardConfig>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state.service.replace_config(&caller, config) {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<SubmitScorecardRequest>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state
        .service
        .submit(&caller, ApplicationId(application_id), request.data)
    {
        Ok((submission, SubmissionOutcome::Created)) => {
            (StatusCode::CREATED, axum::Json(submission)).into_response()
        }
        Ok((submission, SubmissionOutcome::Replaced)) => {
            (StatusCode::OK, axum::Json(submission)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submissions_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state
        .service
        .submissions(&caller, &ApplicationId(application_id))
    {
        Ok(submissions) => (StatusCode::OK, axum::Json(submissions)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn aggregate_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state
        .service
        .aggregate(&caller, &ApplicationId(application_id))
    {
        Ok(aggregates) => (StatusCode::OK, axum::Json(aggregates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ranking_handler<R>(
    State(state): State<ScorecardState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: ScorecardRepository + 'static,
{
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthenticated();
    };

    match state.service.ranking(&caller, state.ranking_limit) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}
