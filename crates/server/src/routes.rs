use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod admin;
pub mod auth;
pub mod bank_accounts;
pub mod customers;
pub mod invoices;
pub mod services;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: public, session-gated and admin routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes (health + docs)
    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Sign-in and registration; a caller that already has a session is sent home
    let sign_in = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::redirect_if_signed_in));

    let session = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/api/customers", get(customers::list_customers).post(customers::create_customer))
        .route(
            "/api/customers/:id",
            get(customers::get_customer).put(customers::update_customer).delete(customers::delete_customer),
        )
        .route("/api/bank-accounts", get(bank_accounts::list_bank_accounts).post(bank_accounts::create_bank_account))
        .route(
            "/api/bank-accounts/:id",
            get(bank_accounts::get_bank_account)
                .put(bank_accounts::update_bank_account)
                .delete(bank_accounts::delete_bank_account),
        )
        .route("/api/services", get(services::list_services).post(services::create_service))
        .route(
            "/api/services/:id",
            get(services::get_service).put(services::update_service).delete(services::delete_service),
        )
        .route("/api/invoices", get(invoices::list_invoices).post(invoices::create_invoice))
        .route(
            "/api/invoices/:id",
            get(invoices::get_invoice).put(invoices::update_invoice).delete(invoices::delete_invoice),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

    // Admin routes: session first, then the role check
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", get(admin::get_user).put(admin::update_user).delete(admin::delete_user))
        .route("/admin/activity-logs", get(admin::list_activity_logs))
        .route("/admin/trash/:table", get(admin::list_trash))
        .route("/admin/trash/:table/:id/restore", post(admin::restore))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

    Router::new()
        .merge(public)
        .merge(sign_in)
        .merge(session)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
