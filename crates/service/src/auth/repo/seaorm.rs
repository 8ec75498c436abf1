use chrono::Duration;
use models::activity_log::{self, ActivityLogInput};
use models::errors::ModelError;
use models::{session, user, user_credentials};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::{AuthUser, Credentials, RegisterInput, SessionRecord};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn repo_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(v) => AuthError::Validation(v),
        other => AuthError::Repository(other.to_string()),
    }
}

fn to_session(s: session::Model) -> SessionRecord {
    SessionRecord { id: s.id, user_id: s.user_id, expires_at: s.expires_at }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(res.as_ref().map(AuthUser::from_model))
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.as_ref().map(AuthUser::from_model))
    }

    async fn create_account(&self, input: &RegisterInput, password_hash: String, password_algorithm: &str) -> Result<AuthUser, AuthError> {
        let created = user::create_with_password(&self.db, input, password_hash, password_algorithm)
            .await
            .map_err(repo_err)?;
        Ok(AuthUser::from_model(&created))
    }

    async fn get_credentials(&self, user_id: &str) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await.map_err(repo_err)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn create_session(&self, user_id: &str, ttl: Duration, user_agent: Option<String>) -> Result<SessionRecord, AuthError> {
        let s = session::create(&self.db, user_id, ttl, user_agent).await.map_err(repo_err)?;
        Ok(to_session(s))
    }

    async fn find_live_session(&self, id: &str) -> Result<Option<SessionRecord>, AuthError> {
        let s = session::find_live(&self.db, id).await.map_err(repo_err)?;
        Ok(s.map(to_session))
    }

    async fn revoke_session(&self, id: &str) -> Result<bool, AuthError> {
        session::revoke(&self.db, id).await.map_err(repo_err)
    }

    async fn record_activity(&self, input: ActivityLogInput) -> Result<(), AuthError> {
        activity_log::record(&self.db, input).await.map_err(repo_err)?;
        Ok(())
    }
}
