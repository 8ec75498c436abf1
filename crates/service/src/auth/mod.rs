//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, session resolution and logout live here; the HTTP
//! layer only moves cookies around.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::{AuthService, AuthServiceConfig};
