//! Admin view over soft-deleted rows.

use models::activity_log::{ActivityAction, ActivityLogInput};
use models::soft_delete::{self, Table};
use sea_orm::{DatabaseConnection, JsonValue};
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud;
use crate::errors::ServiceError;

/// Every deleted row of `table`, oldest first.
pub async fn list_deleted(db: &DatabaseConnection, table: Table) -> Result<Vec<JsonValue>, ServiceError> {
    Ok(soft_delete::get_deleted_records(db, table).await?)
}

/// Bring a deleted row back. A row that is not in the trash is `NotFound`.
#[instrument(skip(db, ctx), fields(user_id = %ctx.user_id, %table, %id))]
pub async fn restore(db: &DatabaseConnection, ctx: &AuthContext, table: Table, id: &str) -> Result<(), ServiceError> {
    if !soft_delete::restore(db, table, id).await? {
        return Err(ServiceError::NotFound(format!("deleted {} not found", table.label())));
    }
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Restore, table, id)).await?;
    info!("record_restored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer_service;
    use crate::test_support::{admin_ctx, get_db};
    use models::customer::CreateCustomer;

    #[tokio::test]
    async fn delete_restore_round_trip() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let input = CreateCustomer { name: "Acme".into(), email: "a@acme.test".into(), ..Default::default() };
        let c = customer_service::create_customer(&db, &ctx, input).await?;
        customer_service::delete_customer(&db, &ctx, &c.id).await?;

        let trash = list_deleted(&db, Table::Customer).await?;
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0]["id"], c.id.as_str());
        assert!(soft_delete::get_active_records(&db, Table::Customer).await?.is_empty());

        restore(&db, &ctx, Table::Customer, &c.id).await?;
        assert!(list_deleted(&db, Table::Customer).await?.is_empty());
        assert_eq!(customer_service::get_customer(&db, &c.id).await?.name, "Acme");

        let again = restore(&db, &ctx, Table::Customer, &c.id).await;
        assert!(matches!(again, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
