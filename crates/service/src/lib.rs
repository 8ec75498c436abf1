//! Service layer providing business operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Every mutation is recorded in the activity log with the acting user.

pub mod errors;
pub mod crud;
pub mod auth;
pub mod customer_service;
pub mod bank_account_service;
pub mod service_catalog;
pub mod invoice_service;
pub mod user_service;
pub mod activity_log_service;
pub mod trash_service;
#[cfg(test)]
pub mod test_support;

pub use crud::ListParams;
pub use errors::ServiceError;
