#![cfg(test)]
use sea_orm::DatabaseConnection;

use crate::auth::domain::AuthContext;

/// Fresh migrated in-memory database; every test gets its own.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}

pub fn admin_ctx() -> AuthContext {
    AuthContext {
        user_id: "admin-1".into(),
        email: "admin@example.com".into(),
        name: "Admin".into(),
        role: models::user::Role::Admin,
        session_id: "session-1".into(),
    }
}
