//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use common::protocol::{ErrorResponse, HealthResponse};
use common::ServiceError;
use envelope::EnvelopeError;
use tracing::error;
use uuid::Uuid;

use super::state::AppState;

/// `POST /tx/encrypt`: encrypt `{partyId, payload}` and store the record.
///
/// Responds `201 Created` with the stored [`envelope::SecureRecord`].
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            let err = ServiceError::BadRequest(format!("Invalid request: {}", rejection.body_text()));
            return error_response(&err);
        }
    };

    let input = match envelope::validate_encrypt_value(&body) {
        Ok(input) => input,
        Err(EnvelopeError::Validation(msg)) => {
            return error_response(&ServiceError::BadRequest(format!("Invalid request: {msg}")));
        }
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    match state.service.encrypt(input).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /tx`: public metadata of every stored record, newest first.
pub async fn list(State(state): State<AppState>) -> Response {
    match state.service.list().await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /tx/:id`: the stored record, still encrypted.
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if let Err(e) = validate_id(&id) {
        return error_response(&e);
    }
    match state.service.get(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /tx/:id/decrypt`: `{id, partyId, payload}` of a stored record.
pub async fn decrypt(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if let Err(e) = validate_id(&id) {
        return error_response(&e);
    }
    match state.service.decrypt(&id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /health`: storage backend health.
///
/// Returns `200 OK` when the store is healthy, `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let healthy = state.service.health_check().await;
    let (status_code, status_str) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let body = HealthResponse {
        status: status_str.into(),
        storage: state.service.storage_name().into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    error_response(&ServiceError::NotFound(
        "the requested resource does not exist".into(),
    ))
}

fn validate_id(id: &str) -> Result<(), ServiceError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ServiceError::BadRequest("Invalid request: id must be a valid UUID".into()))
}

/// Render a [`ServiceError`] as its JSON error body and status code.
fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "request failed");
    }
    (status, Json(ErrorResponse::from(err))).into_response()
}
