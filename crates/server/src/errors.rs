use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::{ErrorBody, FieldErrorBody};
use models::errors::ValidationFailure;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

/// JSON error response: `{error, message?, fields?}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: Option<String>) -> Self {
        Self { status, body: ErrorBody { error: error.into(), message, fields: Vec::new() } }
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), Some(message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::with_status(StatusCode::BAD_REQUEST, message) }
    pub fn unauthorized(message: impl Into<String>) -> Self { Self::with_status(StatusCode::UNAUTHORIZED, message) }
    pub fn forbidden(message: impl Into<String>) -> Self { Self::with_status(StatusCode::FORBIDDEN, message) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::with_status(StatusCode::NOT_FOUND, message) }
}

impl From<ValidationFailure> for JsonApiError {
    fn from(v: ValidationFailure) -> Self {
        let fields = v
            .violations
            .into_iter()
            .map(|f| FieldErrorBody { field: f.field, code: f.code, message: f.message })
            .collect();
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody { error: "Validation Error".into(), message: Some("request validation failed".into()), fields },
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(v) => v.into(),
            ServiceError::NotFound(m) => Self::not_found(m),
            ServiceError::Conflict(m) => Self::with_status(StatusCode::CONFLICT, m),
            ServiceError::Unauthorized(m) => Self::unauthorized(m),
            ServiceError::Forbidden(m) => Self::forbidden(m),
            ServiceError::Db(m) => Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, m),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self { ServiceError::from(e).into() }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = ?self.body.message, "request failed");
        } else {
            debug!(status = self.status.as_u16(), error = %self.body.error, "request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
