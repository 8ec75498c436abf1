use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

use service::auth::domain::{AuthContext, AuthUser, LoginInput, RegisterInput};
use service::auth::errors::AuthError;
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthService, AuthServiceConfig};

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson};

pub const SIGN_IN_PATH: &str = "/sign-in";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub cookie_name: String,
    pub secure_cookie: bool,
}

impl From<&configs::AuthConfig> for ServerAuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { cookie_name: c.cookie_name.clone(), secure_cookie: c.secure_cookie }
    }
}

/// Shared per-process state, cloned into every request.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub auth_svc: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: &configs::AuthConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth_svc = Arc::new(AuthService::new(repo, AuthServiceConfig::from(auth)));
        Self { db, auth: ServerAuthConfig::from(auth), auth_svc }
    }
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user: AuthUser,
    pub expires_at: DateTime<FixedOffset>,
}

fn session_cookie(cfg: &ServerAuthConfig, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(cfg.cookie_name.clone(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(cfg.secure_cookie);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(input): ValidJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let user = state.auth_svc.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized"), (status = 403, description = "Account disabled")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    headers: HeaderMap,
    ValidJson(input): ValidJson<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(255).collect::<String>());
    let session = state.auth_svc.login(input, user_agent).await?;
    let jar = jar.add(session_cookie(&state.auth, session.token));
    Ok((jar, Json(LoginOutput { user: session.user, expires_at: session.expires_at })))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Logged Out"), (status = 401, description = "Unauthorized")))]
pub async fn logout(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), JsonApiError> {
    state.auth_svc.logout(&ctx).await?;
    let jar = jar.remove(session_cookie(&state.auth, String::new()));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, CurrentUser(ctx): CurrentUser) -> Result<Json<AuthUser>, JsonApiError> {
    Ok(Json(state.auth_svc.current_user(&ctx).await?))
}

/// Resolve the session cookie, if any. A missing, forged, expired or revoked
/// session is `None`; only storage failures are errors.
async fn resolve_session(state: &ServerState, headers: &HeaderMap) -> Result<Option<AuthContext>, JsonApiError> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(&state.auth.cookie_name) else {
        return Ok(None);
    };
    match state.auth_svc.authenticate(cookie.value()).await {
        Ok(ctx) => Ok(Some(ctx)),
        Err(AuthError::Unauthorized) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Gate for every non-public route: attaches the caller's `AuthContext`.
/// Browsers are sent to the sign-in page, API clients get 401.
pub async fn require_session(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    match resolve_session(&state, req.headers()).await {
        Ok(Some(ctx)) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Ok(None) => {
            let path = req.uri().path().to_string();
            if wants_html(req.headers()) {
                Redirect::to(SIGN_IN_PATH).into_response()
            } else {
                warn!(path = %path, "missing or invalid session");
                JsonApiError::unauthorized("sign in required").into_response()
            }
        }
        Err(e) => e.into_response(),
    }
}

/// Sign-in and registration are pointless with a live session; send the caller home.
pub async fn redirect_if_signed_in(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    match resolve_session(&state, req.headers()).await {
        Ok(Some(_)) => Redirect::to("/").into_response(),
        Ok(None) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

/// Runs after `require_session`.
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthContext>() {
        Some(ctx) if ctx.is_admin() => next.run(req).await,
        Some(ctx) => {
            warn!(user_id = %ctx.user_id, path = %req.uri().path(), "admin route denied");
            JsonApiError::forbidden("admin role required").into_response()
        }
        None => JsonApiError::unauthorized("sign in required").into_response(),
    }
}
