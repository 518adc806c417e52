use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::bureau::CreditBureau;
use super::domain::{ApplicationId, LoanApplication, SoftPullRecord};
use super::intake::{check_utilization, IntakeSubmission};
use super::repository::{ApplicationStore, StoreError};
use super::service::{ScoreOverrides, ServiceError, UnderwritingService};

pub(crate) const INTAKE_CHANNEL: &str = "api-intake";

/// Body for the stateless scoring endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub application: LoanApplication,
    #[serde(default)]
    pub soft_pull: Option<SoftPullRecord>,
}

/// Router builder exposing HTTP endpoints for scoring and stored applications.
pub fn underwriting_router<S, B>(service: Arc<UnderwritingService<S, B>>) -> Router
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    Router::new()
        .route("/api/v1/underwriting/score", post(score_handler::<S, B>))
        .route(
            "/api/v1/underwriting/applications",
            post(submit_handler::<S, B>).get(list_handler::<S, B>),
        )
        .route(
            "/api/v1/underwriting/applications/:application_id",
            get(fetch_handler::<S, B>),
        )
        .route(
            "/api/v1/underwriting/applications/:application_id/score",
            post(rescore_handler::<S, B>),
        )
        .with_state(service)
}

pub(crate) async fn score_handler<S, B>(
    State(service): State<Arc<UnderwritingService<S, B>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    let reported = request
        .soft_pull
        .as_ref()
        .and_then(|pull| pull.utilization_pct);
    if let Err(violation) = check_utilization(reported) {
        return error_response(violation.into());
    }

    let result = service
        .engine()
        .score(&request.application, request.soft_pull.as_ref());
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn submit_handler<S, B>(
    State(service): State<Arc<UnderwritingService<S, B>>>,
    axum::Json(submission): axum::Json<IntakeSubmission>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    match service.submit(submission, INTAKE_CHANNEL) {
        Ok(scored) => (StatusCode::CREATED, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S, B>(
    State(service): State<Arc<UnderwritingService<S, B>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    match service.list() {
        Ok(ids) => {
            let payload = json!({ "application_ids": ids });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S, B>(
    State(service): State<Arc<UnderwritingService<S, B>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rescore_handler<S, B>(
    State(service): State<Arc<UnderwritingService<S, B>>>,
    Path(application_id): Path<String>,
    overrides: Option<axum::Json<ScoreOverrides>>,
) -> Response
where
    S: ApplicationStore + 'static,
    B: CreditBureau + 'static,
{
    let overrides = overrides.map(|axum::Json(body)| body).unwrap_or_default();
    match service.score(&ApplicationId(application_id), overrides) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) | ServiceError::MissingIdentifier => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
