use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::pagination::Paginated;
use models::bank_account::{self, CreateBankAccount, UpdateBankAccount};
use service::bank_account_service::BankAccountListParams;
use service::bank_account_service;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson, ValidQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(
    post, path = "/api/bank-accounts", tag = "bank-accounts",
    request_body = crate::openapi::CreateBankAccountDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create_bank_account(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    ValidJson(input): ValidJson<CreateBankAccount>,
) -> Result<(StatusCode, Json<bank_account::Model>), JsonApiError> {
    let created = bank_account_service::create_bank_account(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/bank-accounts", tag = "bank-accounts",
    params(crate::openapi::BankAccountQueryDoc),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_bank_accounts(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<BankAccountListParams>,
) -> Result<Json<Paginated<bank_account::Model>>, JsonApiError> {
    Ok(Json(bank_account_service::list_bank_accounts(&state.db, &params).await?))
}

#[utoipa::path(
    get, path = "/api/bank-accounts/{id}", tag = "bank-accounts",
    params(("id" = String, Path, description = "Bank account id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_bank_account(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<bank_account::Model>, JsonApiError> {
    Ok(Json(bank_account_service::get_bank_account(&state.db, &id).await?))
}

#[utoipa::path(
    put, path = "/api/bank-accounts/{id}", tag = "bank-accounts",
    params(("id" = String, Path, description = "Bank account id")),
    request_body = crate::openapi::UpdateBankAccountDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_bank_account(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateBankAccount>,
) -> Result<Json<bank_account::Model>, JsonApiError> {
    Ok(Json(bank_account_service::update_bank_account(&state.db, &ctx, &id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/bank-accounts/{id}", tag = "bank-accounts",
    params(("id" = String, Path, description = "Bank account id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_bank_account(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    bank_account_service::delete_bank_account(&state.db, &ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
