use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::RawApplication;
use super::notifier::Notifier;
use super::repository::ApplicationRepository;
use super::service::{ErrorKind, RecruitmentService, SubmissionError};
use super::validation::ValidationError;

/// Router builder exposing the public submission endpoint.
///
/// Stored applications are only readable through the service (operator CLI); there is no
/// HTTP read route.
pub fn recruitment_router<R, N>(service: Arc<RecruitmentService<R, N>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/recruitment/applications",
            post(submit_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<RecruitmentService<R, N>>>,
    payload: Result<Json<RawApplication>, JsonRejection>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: Notifier + 'static,
{
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            let error = ValidationError::single("body", rejection.body_text());
            return validation_response(&error);
        }
    };

    match service.submit(raw).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(SubmissionError::Validation(error)) => validation_response(&error),
        Err(other) => {
            let status = match other.kind() {
                ErrorKind::PersistenceError => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::DeliveryError => StatusCode::BAD_GATEWAY,
                ErrorKind::ConfigurationError | ErrorKind::ValidationError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(status, other.kind().as_str(), &other.to_string(), None)
        }
    }
}

fn validation_response(error: &ValidationError) -> Response {
    let fields = serde_json::to_value(&error.fields).unwrap_or(Value::Null);
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorKind::ValidationError.as_str(),
        &error.to_string(),
        Some(fields),
    )
}

fn error_response(
    status: StatusCode,
    kind: &str,
    message: &str,
    fields: Option<Value>,
) -> Response {
    let mut error = json!({
        "kind": kind,
        "message": message,
    });
    if let Some(fields) = fields {
        error["fields"] = fields;
    }
    (status, Json(json!({ "error": error }))).into_response()
}
