//! Admin-only endpoints: user management, the activity log and the trash.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::pagination::Paginated;
use models::{activity_log, user, user::UpdateUser, Table};
use sea_orm::JsonValue;
use service::activity_log_service::{self, ActivityListParams};
use service::crud::ListParams;
use service::{trash_service, user_service};

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson, ValidQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/admin/users", tag = "admin", params(crate::openapi::ListQueryDoc), responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn list_users(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Paginated<user::Model>>, JsonApiError> {
    Ok(Json(user_service::list_users(&state.db, &params).await?))
}

#[utoipa::path(get, path = "/admin/users/{id}", tag = "admin", params(("id" = String, Path, description = "User id")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_user(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::get_user(&state.db, &id).await?))
}

#[utoipa::path(put, path = "/admin/users/{id}", tag = "admin", params(("id" = String, Path, description = "User id")), request_body = crate::openapi::UpdateUserDoc, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 403, description = "Forbidden"), (status = 409, description = "Conflict")))]
pub async fn update_user(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateUser>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::update_user(&state.db, &ctx, &id, input).await?))
}

#[utoipa::path(delete, path = "/admin/users/{id}", tag = "admin", params(("id" = String, Path, description = "User id")), responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn delete_user(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    user_service::delete_user(&state.db, &ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/admin/activity-logs", tag = "admin", params(crate::openapi::ActivityQueryDoc), responses((status = 200, description = "OK")))]
pub async fn list_activity_logs(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<ActivityListParams>,
) -> Result<Json<Paginated<activity_log::Model>>, JsonApiError> {
    Ok(Json(activity_log_service::list_activity(&state.db, &params).await?))
}

fn parse_table(raw: &str) -> Result<Table, JsonApiError> {
    raw.parse::<Table>().map_err(|_| JsonApiError::not_found(format!("unknown table `{raw}`")))
}

#[utoipa::path(get, path = "/admin/trash/{table}", tag = "admin", params(("table" = String, Path, description = "user, customer, bank_account, service or payment_invoice")), responses((status = 200, description = "Deleted rows, oldest first"), (status = 404, description = "Unknown table")))]
pub async fn list_trash(State(state): State<ServerState>, Path(table): Path<String>) -> Result<Json<Vec<JsonValue>>, JsonApiError> {
    let table = parse_table(&table)?;
    Ok(Json(trash_service::list_deleted(&state.db, table).await?))
}

#[utoipa::path(post, path = "/admin/trash/{table}/{id}/restore", tag = "admin", params(("table" = String, Path, description = "Table name"), ("id" = String, Path, description = "Row id")), responses((status = 204, description = "Restored"), (status = 404, description = "Not in trash")))]
pub async fn restore(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path((table, id)): Path<(String, String)>,
) -> Result<StatusCode, JsonApiError> {
    let table = parse_table(&table)?;
    trash_service::restore(&state.db, &ctx, table, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
