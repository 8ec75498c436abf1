use async_trait::async_trait;
use chrono::Duration;
use models::activity_log::ActivityLogInput;
use models::user::Role;

use super::domain::{AuthUser, Credentials, RegisterInput, SessionRecord};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Any user with this email, including disabled or deleted ones.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<AuthUser>, AuthError>;
    /// Create the user and their credentials atomically. The first account
    /// ever created gets `Role::Admin`, every later one `Role::Member`.
    async fn create_account(&self, input: &RegisterInput, password_hash: String, password_algorithm: &str) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: &str) -> Result<Option<Credentials>, AuthError>;

    async fn create_session(&self, user_id: &str, ttl: Duration, user_agent: Option<String>) -> Result<SessionRecord, AuthError>;
    /// The session if it exists, is not revoked and has not expired.
    async fn find_live_session(&self, id: &str) -> Result<Option<SessionRecord>, AuthError>;
    async fn revoke_session(&self, id: &str) -> Result<bool, AuthError>;

    async fn record_activity(&self, input: ActivityLogInput) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Mutex, MutexGuard};
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,            // key: email
        creds: Mutex<HashMap<String, Credentials>>,         // key: user_id
        sessions: Mutex<HashMap<String, SessionRecord>>,    // key: session id
        revoked: Mutex<HashSet<String>>,
        activity: Mutex<Vec<ActivityLogInput>>,
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, AuthError> {
        m.lock().map_err(|_| AuthError::Repository("mock repository lock poisoned".into()))
    }

    impl MockAuthRepository {
        /// Activity entries recorded so far.
        pub fn activity(&self) -> Vec<ActivityLogInput> {
            lock(&self.activity).map(|a| a.clone()).unwrap_or_default()
        }

        /// Flip a user's active flag, as an admin disabling the account would.
        pub fn set_active(&self, user_id: &str, active: bool) -> Result<(), AuthError> {
            let mut users = lock(&self.users)?;
            if let Some(u) = users.values_mut().find(|u| u.id == user_id) {
                u.active = active;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.get(&models::user::normalize_email(email)).cloned())
        }

        async fn find_user_by_id(&self, id: &str) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.values().find(|u| u.id == id).cloned())
        }

        async fn create_account(&self, input: &RegisterInput, password_hash: String, password_algorithm: &str) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            let email = models::user::normalize_email(&input.email);
            if users.contains_key(&email) {
                return Err(AuthError::Conflict);
            }
            let role = if users.is_empty() { Role::Admin } else { Role::Member };
            let user = AuthUser { id: Uuid::new_v4().to_string(), email: email.clone(), name: input.name.clone(), role, active: true };
            let c = Credentials { user_id: user.id.clone(), password_hash, password_algorithm: password_algorithm.to_string() };
            lock(&self.creds)?.insert(user.id.clone(), c);
            users.insert(email, user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: &str) -> Result<Option<Credentials>, AuthError> {
            Ok(lock(&self.creds)?.get(user_id).cloned())
        }

        async fn create_session(&self, user_id: &str, ttl: Duration, _user_agent: Option<String>) -> Result<SessionRecord, AuthError> {
            let s = SessionRecord { id: Uuid::new_v4().to_string(), user_id: user_id.to_string(), expires_at: (Utc::now() + ttl).into() };
            lock(&self.sessions)?.insert(s.id.clone(), s.clone());
            Ok(s)
        }

        async fn find_live_session(&self, id: &str) -> Result<Option<SessionRecord>, AuthError> {
            if lock(&self.revoked)?.contains(id) {
                return Ok(None);
            }
            Ok(lock(&self.sessions)?.get(id).filter(|s| s.expires_at > Utc::now()).cloned())
        }

        async fn revoke_session(&self, id: &str) -> Result<bool, AuthError> {
            if !lock(&self.sessions)?.contains_key(id) {
                return Ok(false);
            }
            Ok(lock(&self.revoked)?.insert(id.to_string()))
        }

        async fn record_activity(&self, input: ActivityLogInput) -> Result<(), AuthError> {
            lock(&self.activity)?.push(input);
            Ok(())
        }
    }
}
