use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::pagination::Paginated;
use models::service::{self as catalog, CreateService, UpdateService};
use service::service_catalog::ServiceListParams;
use service::service_catalog;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson, ValidQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(
    post, path = "/api/services", tag = "services",
    request_body = crate::openapi::CreateServiceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create_service(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    ValidJson(input): ValidJson<CreateService>,
) -> Result<(StatusCode, Json<catalog::Model>), JsonApiError> {
    let created = service_catalog::create_service(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/services", tag = "services",
    params(crate::openapi::ServiceQueryDoc),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_services(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<ServiceListParams>,
) -> Result<Json<Paginated<catalog::Model>>, JsonApiError> {
    Ok(Json(service_catalog::list_services(&state.db, &params).await?))
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<catalog::Model>, JsonApiError> {
    Ok(Json(service_catalog::get_service(&state.db, &id).await?))
}

#[utoipa::path(
    put, path = "/api/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    request_body = crate::openapi::UpdateServiceDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_service(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateService>,
) -> Result<Json<catalog::Model>, JsonApiError> {
    Ok(Json(service_catalog::update_service(&state.db, &ctx, &id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_service(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    service_catalog::delete_service(&state.db, &ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
