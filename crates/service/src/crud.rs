//! Soft-delete aware building blocks shared by the entity services.
//!
//! "Active" always means `deleted_at IS NULL`; nothing here ever returns or
//! mutates a deleted row except through the trash service.

use common::pagination::{PageMeta, Paginated, Pagination};
use models::activity_log::{self, ActivityAction, ActivityLogInput};
use models::soft_delete::{self, SoftDelete, Table};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Query-string parameters accepted by every list endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination { Pagination::new(self.page, self.limit).normalize() }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> { non_empty(self.search.as_deref()) }
}

/// Case-insensitive substring match. `%`, `_` and `\` in `term` match themselves.
pub(crate) fn contains_ci<C: ColumnTrait>(col: C, term: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Expr::expr(Func::lower(Expr::col((col.entity_name(), col)))).like(LikeExpr::new(pattern).escape('\\'))
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> { value.map(str::trim).filter(|s| !s.is_empty()) }

/// Active row by id, if any.
pub async fn find_active<E>(db: &DatabaseConnection, id: &str) -> Result<Option<E::Model>, ServiceError>
where
    E: SoftDelete,
    E::Model: Send + Sync + 'static,
{
    let found = E::find()
        .filter(E::id_column().eq(id))
        .filter(E::deleted_at_column().is_null())
        .one(db)
        .await?;
    Ok(found)
}

/// Active row by id, or `NotFound`.
pub async fn get_active<E>(db: &DatabaseConnection, id: &str) -> Result<E::Model, ServiceError>
where
    E: SoftDelete,
    E::Model: Send + Sync + 'static,
{
    find_active::<E>(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(E::TABLE.label()))
}

/// One page of active rows matching `filter`, newest first.
pub async fn list_active<E>(
    db: &DatabaseConnection,
    pagination: Pagination,
    filter: Condition,
) -> Result<Paginated<E::Model>, ServiceError>
where
    E: SoftDelete,
    E::Model: Send + Sync + 'static,
{
    let p = pagination.normalize();
    let base = E::find().filter(E::deleted_at_column().is_null()).filter(filter);
    let total = base.clone().count(db).await?;
    let meta = PageMeta::new(p.page, p.limit, total);
    let data = base
        .order_by_desc(E::created_at_column())
        .order_by_desc(E::id_column())
        .offset((meta.current_page - 1) * p.limit)
        .limit(p.limit)
        .all(db)
        .await?;
    debug!(table = %E::TABLE, total, page = meta.current_page, "list_active");
    Ok(Paginated::new(data, meta))
}

/// Soft-delete an active row and log it. A missing or already deleted row is `NotFound`.
pub async fn delete_record(
    db: &DatabaseConnection,
    actor: Option<&str>,
    table: Table,
    id: &str,
) -> Result<(), ServiceError> {
    if !soft_delete::soft_delete(db, table, id).await? {
        return Err(ServiceError::not_found(table.label()));
    }
    log_activity(db, ActivityLogInput::new(actor, ActivityAction::Delete, table, id)).await?;
    info!(%table, %id, "record_deleted");
    Ok(())
}

/// Append to the activity log after a successful mutation.
pub async fn log_activity(db: &DatabaseConnection, input: ActivityLogInput) -> Result<(), ServiceError> {
    activity_log::record(db, input).await?;
    Ok(())
}
