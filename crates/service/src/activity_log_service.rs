use common::pagination::{PageMeta, Paginated};
use models::activity_log;
use models::Table;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;

use crate::crud::{non_empty, ListParams};
use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActivityListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub entity: Option<Table>,
    pub user_id: Option<String>,
}

/// Page through the audit trail, newest first.
pub async fn list_activity(
    db: &DatabaseConnection,
    params: &ActivityListParams,
) -> Result<Paginated<activity_log::Model>, ServiceError> {
    let p = ListParams { page: params.page, limit: params.limit, search: None }.pagination();
    let mut query = activity_log::Entity::find();
    if let Some(entity) = params.entity {
        query = query.filter(activity_log::Column::Entity.eq(entity.as_str()));
    }
    if let Some(user_id) = non_empty(params.user_id.as_deref()) {
        query = query.filter(activity_log::Column::UserId.eq(user_id));
    }
    let total = query.clone().count(db).await?;
    let meta = PageMeta::new(p.page, p.limit, total);
    let data = query
        .order_by_desc(activity_log::Column::Id)
        .offset((meta.current_page - 1) * p.limit)
        .limit(p.limit)
        .all(db)
        .await?;
    Ok(Paginated::new(data, meta))
}
