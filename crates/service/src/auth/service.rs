use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::schema::validate_typed;
use models::soft_delete::Table;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthContext, AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::SessionTokens;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthServiceConfig {
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthServiceConfig {
    pub fn new(session_secret: impl Into<String>, session_ttl_hours: i64) -> Self {
        Self { session_secret: session_secret.into(), session_ttl_hours, password_algorithm: "argon2".into() }
    }
}

impl From<&configs::AuthConfig> for AuthServiceConfig {
    fn from(c: &configs::AuthConfig) -> Self { Self::new(c.session_secret.clone(), c.session_ttl_hours) }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthServiceConfig,
    tokens: SessionTokens,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthServiceConfig) -> Self {
        let tokens = SessionTokens::new(&cfg.session_secret);
        Self { repo, cfg, tokens }
    }

    /// Register a new user with a hashed password. The very first account
    /// becomes an admin, every later one a member.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthServiceConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthServiceConfig::new("secret", 24));
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        validate_typed(&input)?;
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        let user = self.repo.create_account(&input, hash, &self.cfg.password_algorithm).await?;
        self.repo
            .record_activity(ActivityLogInput::new(Some(&user.id), ActivityAction::Create, Table::User, &user.id).describe("registered"))
            .await?;
        info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "user_registered");
        Ok(user)
    }

    /// Check credentials and open a session. The returned token is the cookie value.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthServiceConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthServiceConfig::new("secret", 24));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() }, None)).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input, user_agent), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput, user_agent: Option<String>) -> Result<AuthSession, AuthError> {
        validate_typed(&input)?;
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(&user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }
        if !user.active {
            warn!(user_id = %user.id, "login_disabled_account");
            return Err(AuthError::Disabled);
        }

        let ttl = chrono::Duration::hours(self.cfg.session_ttl_hours);
        let session = self.repo.create_session(&user.id, ttl, user_agent).await?;
        let token = self.tokens.issue(&session.id, &user.id, session.expires_at)?;
        self.repo
            .record_activity(ActivityLogInput::new(Some(&user.id), ActivityAction::Login, Table::User, &user.id))
            .await?;
        info!(user_id = %user.id, session_id = %session.id, "user_logged_in");

        Ok(AuthSession { user, session_id: session.id, token, expires_at: session.expires_at })
    }

    /// Resolve a cookie value to the caller. Bad signatures, expired or revoked
    /// sessions and inactive users all come back as `Unauthorized`.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.tokens.verify(token)?;
        let session = self.repo
            .find_live_session(&claims.sid)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        let user = self.repo
            .find_user_by_id(&session.user_id)
            .await?
            .filter(|u| u.active)
            .ok_or(AuthError::Unauthorized)?;
        Ok(AuthContext { user_id: user.id, email: user.email, name: user.name, role: user.role, session_id: session.id })
    }

    /// Revoke the caller's session.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn logout(&self, ctx: &AuthContext) -> Result<(), AuthError> {
        if self.repo.revoke_session(&ctx.session_id).await? {
            self.repo
                .record_activity(ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Logout, Table::User, &ctx.user_id))
                .await?;
            info!(session_id = %ctx.session_id, "user_logged_out");
        }
        Ok(())
    }

    /// Lookup used by `GET /api/auth/me`.
    pub async fn current_user(&self, ctx: &AuthContext) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(&ctx.user_id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::SeaOrmAuthRepository;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::test_support::get_db;
    use models::user::Role;
    use sea_orm::EntityTrait;

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Test".into(), password: "Passw0rd!".into() }
    }

    fn login_input(email: &str, password: &str) -> LoginInput {
        LoginInput { email: email.into(), password: password.into() }
    }

    fn mock_service() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthServiceConfig::new("test-secret", 1));
        (repo, svc)
    }

    #[tokio::test]
    async fn first_user_is_admin_then_members() {
        let (_, svc) = mock_service();
        let first = svc.register(register_input("a@example.com")).await.unwrap();
        let second = svc.register(register_input("b@example.com")).await.unwrap();
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::Member);
    }

    #[tokio::test]
    async fn concurrent_first_registrations_yield_one_admin() -> anyhow::Result<()> {
        let db = get_db().await?;
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), AuthServiceConfig::new("test-secret", 1));
        let (a, b) = tokio::join!(svc.register(register_input("a@example.com")), svc.register(register_input("b@example.com")));
        let admins = [a, b].into_iter().filter_map(Result::ok).filter(|u| u.role == Role::Admin).count();
        assert_eq!(admins, 1);
        for user in models::user::Entity::find().all(&db).await? {
            assert!(models::user_credentials::find_by_user(&db, &user.id).await?.is_some());
        }
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let (_, svc) = mock_service();
        svc.register(register_input("a@example.com")).await.unwrap();
        let err = svc.register(register_input("A@Example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn register_rejects_invalid_input() {
        let (_, svc) = mock_service();
        let err = svc
            .register(RegisterInput { email: "nope".into(), name: "".into(), password: "short".into() })
            .await
            .unwrap_err();
        match err {
            AuthError::Validation(v) => {
                assert!(v.has("email", "email"));
                assert!(v.has("password", "length"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_session_round_trip() {
        let (repo, svc) = mock_service();
        svc.register(register_input("a@example.com")).await.unwrap();

        let session = svc.login(login_input("a@example.com", "Passw0rd!"), Some("tests".into())).await.unwrap();
        let ctx = svc.authenticate(&session.token).await.unwrap();
        assert_eq!(ctx.email, "a@example.com");
        assert_eq!(ctx.session_id, session.session_id);
        assert!(ctx.is_admin());

        svc.logout(&ctx).await.unwrap();
        assert!(matches!(svc.authenticate(&session.token).await, Err(AuthError::Unauthorized)));

        let actions: Vec<_> = repo.activity().into_iter().map(|a| a.action).collect();
        assert_eq!(actions, vec![ActivityAction::Create, ActivityAction::Login, ActivityAction::Logout]);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let (_, svc) = mock_service();
        svc.register(register_input("a@example.com")).await.unwrap();
        assert!(matches!(svc.login(login_input("a@example.com", "wrong-pass"), None).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login_input("x@example.com", "Passw0rd!"), None).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn disabled_user_cannot_login_or_use_old_session() {
        let (repo, svc) = mock_service();
        let user = svc.register(register_input("a@example.com")).await.unwrap();
        let session = svc.login(login_input("a@example.com", "Passw0rd!"), None).await.unwrap();

        repo.set_active(&user.id, false).unwrap();
        assert!(matches!(svc.login(login_input("a@example.com", "Passw0rd!"), None).await, Err(AuthError::Disabled)));
        assert!(matches!(svc.authenticate(&session.token).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn token_from_other_secret_is_rejected() {
        let (_, svc) = mock_service();
        svc.register(register_input("a@example.com")).await.unwrap();
        let session = svc.login(login_input("a@example.com", "Passw0rd!"), None).await.unwrap();

        let other = AuthService::new(Arc::new(MockAuthRepository::default()), AuthServiceConfig::new("other", 1));
        assert!(matches!(other.authenticate(&session.token).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn seaorm_repository_full_flow() -> anyhow::Result<()> {
        let db = get_db().await?;
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), AuthServiceConfig::new("test-secret", 1));

        let admin = svc.register(register_input("admin@example.com")).await?;
        assert_eq!(admin.role, Role::Admin);
        let stored = models::user_credentials::find_by_user(&db, &admin.id).await?.expect("credentials");
        assert!(stored.password_hash.starts_with("$argon2"));

        let session = svc.login(login_input("admin@example.com", "Passw0rd!"), None).await?;
        let ctx = svc.authenticate(&session.token).await?;
        assert_eq!(svc.current_user(&ctx).await?.id, admin.id);

        svc.logout(&ctx).await?;
        assert!(svc.authenticate(&session.token).await.is_err());
        Ok(())
    }
}
