use models::errors::ValidationFailure;
use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("account disabled")]
    Disabled,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<ValidationFailure> for AuthError {
    fn from(v: ValidationFailure) -> Self { AuthError::Validation(v) }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(v) => ServiceError::Validation(v),
            AuthError::Conflict => ServiceError::Conflict("user already exists".into()),
            AuthError::NotFound => ServiceError::not_found("user"),
            AuthError::Unauthorized => ServiceError::Unauthorized("invalid credentials".into()),
            AuthError::Disabled => ServiceError::Forbidden("account disabled".into()),
            AuthError::HashError(m) | AuthError::TokenError(m) | AuthError::Repository(m) => ServiceError::Db(m),
        }
    }
}
