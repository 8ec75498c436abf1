use thiserror::Error;

pub use crate::schema::{FieldViolation, ValidationFailure};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationFailure),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn db(e: impl std::fmt::Display) -> Self { Self::Db(e.to_string()) }

    pub fn invalid(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationFailure::single(field, code, message))
    }
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
