use models::errors::{ModelError, ValidationFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(ValidationFailure),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationFailure::single(field, code, message))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(v) => Self::Validation(v),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<ValidationFailure> for ServiceError {
    fn from(v: ValidationFailure) -> Self { Self::Validation(v) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_keep_their_kind() {
        let v = ServiceError::from(ModelError::invalid("name", "required", "is required"));
        assert!(matches!(v, ServiceError::Validation(ref f) if f.has("name", "required")));
        assert!(matches!(ServiceError::from(ModelError::Db("boom".into())), ServiceError::Db(_)));
    }
}
