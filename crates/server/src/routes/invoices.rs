use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::pagination::Paginated;
use models::payment_invoice::{self, CreateInvoice, UpdateInvoice};
use service::invoice_service::InvoiceListParams;
use service::invoice_service;

use crate::errors::JsonApiError;
use crate::extract::{CurrentUser, ValidJson, ValidQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(
    post, path = "/api/invoices", tag = "invoices",
    request_body = crate::openapi::CreateInvoiceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create_invoice(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    ValidJson(input): ValidJson<CreateInvoice>,
) -> Result<(StatusCode, Json<payment_invoice::Model>), JsonApiError> {
    let created = invoice_service::create_invoice(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/invoices", tag = "invoices",
    params(crate::openapi::InvoiceQueryDoc),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_invoices(
    State(state): State<ServerState>,
    ValidQuery(params): ValidQuery<InvoiceListParams>,
) -> Result<Json<Paginated<payment_invoice::Model>>, JsonApiError> {
    Ok(Json(invoice_service::list_invoices(&state.db, &params).await?))
}

#[utoipa::path(
    get, path = "/api/invoices/{id}", tag = "invoices",
    params(("id" = String, Path, description = "Invoice id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_invoice(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<payment_invoice::Model>, JsonApiError> {
    Ok(Json(invoice_service::get_invoice(&state.db, &id).await?))
}

#[utoipa::path(
    put, path = "/api/invoices/{id}", tag = "invoices",
    params(("id" = String, Path, description = "Invoice id")),
    request_body = crate::openapi::UpdateInvoiceDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_invoice(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateInvoice>,
) -> Result<Json<payment_invoice::Model>, JsonApiError> {
    Ok(Json(invoice_service::update_invoice(&state.db, &ctx, &id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/invoices/{id}", tag = "invoices",
    params(("id" = String, Path, description = "Invoice id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_invoice(
    State(state): State<ServerState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    invoice_service::delete_invoice(&state.db, &ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
