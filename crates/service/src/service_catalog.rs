//! Catalog of billable services.

use common::pagination::Paginated;
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::service::{self, CreateService, UpdateService};
use models::Table;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud::{self, ListParams};
use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn create_service(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    input: CreateService,
) -> Result<service::Model, ServiceError> {
    let created = service::create(db, input).await?;
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Create, Table::Service, &created.id))
        .await?;
    info!(service_id = %created.id, "service_created");
    Ok(created)
}

pub async fn get_service(db: &DatabaseConnection, id: &str) -> Result<service::Model, ServiceError> {
    crud::get_active::<service::Entity>(db, id).await
}

pub async fn list_services(
    db: &DatabaseConnection,
    params: &ServiceListParams,
) -> Result<Paginated<service::Model>, ServiceError> {
    let base = ListParams { page: params.page, limit: params.limit, search: params.search.clone() };
    let mut filter = Condition::all();
    if let Some(term) = base.search_term() {
        filter = filter.add(
            Condition::any()
                .add(crud::contains_ci(service::Column::Name, term))
                .add(crud::contains_ci(service::Column::Description, term)),
        );
    }
    if let Some(active) = params.active {
        filter = filter.add(service::Column::Active.eq(active));
    }
    crud::list_active::<service::Entity>(db, base.pagination(), filter).await
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn update_service(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    id: &str,
    input: UpdateService,
) -> Result<service::Model, ServiceError> {
    let existing = get_service(db, id).await?;
    let updated = service::update(db, existing, input).await?;
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Update, Table::Service, id)).await?;
    info!(service_id = %id, "service_updated");
    Ok(updated)
}

pub async fn delete_service(db: &DatabaseConnection, ctx: &AuthContext, id: &str) -> Result<(), ServiceError> {
    crud::delete_record(db, Some(&ctx.user_id), Table::Service, id).await
}
