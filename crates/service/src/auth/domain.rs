use chrono::{DateTime, FixedOffset};
use models::schema::{FieldKind, FieldSpec, InputSchema};
use models::user::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use models::user::CreateUser as RegisterInput;

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl InputSchema for LoginInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("email", FieldKind::Str),
        FieldSpec::required("password", FieldKind::Str),
    ];
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

impl AuthUser {
    pub fn from_model(u: &models::user::Model) -> Self {
        let role = if u.is_admin() { Role::Admin } else { Role::Member };
        Self { id: u.id.clone(), email: u.email.clone(), name: u.name.clone(), role, active: u.is_active() }
    }
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Stored login session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<FixedOffset>,
}

/// Login result: the session plus the signed cookie value carrying its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub session_id: String,
    pub token: String,
    pub expires_at: DateTime<FixedOffset>,
}

/// The signed-in caller of one request, resolved from its session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub session_id: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
