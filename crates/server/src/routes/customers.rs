use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::pagination::Paginated;
use models::customer::{self, CreateCustomer, UpdateCustomer};
use service::crud::ListParams;
use service::customer_service;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson, ValidQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(
    post, path = "/api/customers", tag = "customers",
    request_body = crate::openapi::CreateCustomerDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create_customer(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    ValidJson(input): ValidJson<CreateCustomer>,
) -> Result<(StatusCode, Json<customer::Model>), JsonApiError> {
    let created = customer_service::create_customer(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/customers", tag = "customers",
    params(crate::openapi::ListQueryDoc),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_customers(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Paginated<customer::Model>>, JsonApiError> {
    Ok(Json(customer_service::list_customers(&state.db, &params).await?))
}

#[utoipa::path(
    get, path = "/api/customers/{id}", tag = "customers",
    params(("id" = String, Path, description = "Customer id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_customer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<customer::Model>, JsonApiError> {
    Ok(Json(customer_service::get_customer(&state.db, &id).await?))
}

#[utoipa::path(
    put, path = "/api/customers/{id}", tag = "customers",
    params(("id" = String, Path, description = "Customer id")),
    request_body = crate::openapi::UpdateCustomerDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_customer(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateCustomer>,
) -> Result<Json<customer::Model>, JsonApiError> {
    Ok(Json(customer_service::update_customer(&state.db, &ctx, &id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/customers/{id}", tag = "customers",
    params(("id" = String, Path, description = "Customer id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_customer(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    customer_service::delete_customer(&state.db, &ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
