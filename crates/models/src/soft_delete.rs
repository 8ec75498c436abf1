//! Soft-delete helpers over the closed set of soft-deletable tables.
//!
//! Rows are never removed here: deleting sets `deleted_at`, restoring clears
//! it. The table is always a [`Table`] variant rendered by the query builder
//! as a quoted identifier, so no caller-supplied string ever reaches the SQL.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Order, Query};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DeriveIden, EntityTrait, FromQueryResult, JsonValue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ModelError;

/// Tables that carry a `deleted_at` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    User,
    Customer,
    BankAccount,
    Service,
    PaymentInvoice,
}

impl Table {
    pub const ALL: [Table; 5] = [Table::User, Table::Customer, Table::BankAccount, Table::Service, Table::PaymentInvoice];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::User => "user",
            Table::Customer => "customer",
            Table::BankAccount => "bank_account",
            Table::Service => "service",
            Table::PaymentInvoice => "payment_invoice",
        }
    }

    /// Human-readable entity name for error messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::User => "user",
            Table::Customer => "customer",
            Table::BankAccount => "bank account",
            Table::Service => "service",
            Table::PaymentInvoice => "invoice",
        }
    }

    fn iden(self) -> Alias { Alias::new(self.as_str()) }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Table {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::invalid("table", "invalid", format!("unknown table `{s}`")))
    }
}

#[derive(DeriveIden)]
enum Col {
    Id,
    CreatedAt,
    DeletedAt,
}

/// Entities stored in one of the [`Table`]s.
pub trait SoftDelete: EntityTrait {
    const TABLE: Table;

    fn id_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
}

/// Mark an active row as deleted. Returns `false` if no active row has `id`.
pub async fn soft_delete(db: &DatabaseConnection, table: Table, id: &str) -> Result<bool, ModelError> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let stmt = Query::update()
        .table(table.iden())
        .value(Col::DeletedAt, now)
        .and_where(Expr::col(Col::Id).eq(id))
        .and_where(Expr::col(Col::DeletedAt).is_null())
        .to_owned();
    let res = db.execute(db.get_database_backend().build(&stmt)).await?;
    debug!(%table, %id, rows = res.rows_affected(), "soft_delete");
    Ok(res.rows_affected() > 0)
}

/// Clear the deletion marker of a deleted row. Returns `false` if no deleted row has `id`.
pub async fn restore(db: &DatabaseConnection, table: Table, id: &str) -> Result<bool, ModelError> {
    let stmt = Query::update()
        .table(table.iden())
        .value(Col::DeletedAt, Option::<sea_orm::prelude::DateTimeWithTimeZone>::None)
        .and_where(Expr::col(Col::Id).eq(id))
        .and_where(Expr::col(Col::DeletedAt).is_not_null())
        .to_owned();
    let res = db.execute(db.get_database_backend().build(&stmt)).await?;
    debug!(%table, %id, rows = res.rows_affected(), "restore");
    Ok(res.rows_affected() > 0)
}

/// All rows of `table` whose `deleted_at` is null, oldest first.
pub async fn get_active_records(db: &DatabaseConnection, table: Table) -> Result<Vec<JsonValue>, ModelError> {
    select_records(db, table, false).await
}

/// All rows of `table` whose `deleted_at` is set, oldest first.
pub async fn get_deleted_records(db: &DatabaseConnection, table: Table) -> Result<Vec<JsonValue>, ModelError> {
    select_records(db, table, true).await
}

async fn select_records(db: &DatabaseConnection, table: Table, deleted: bool) -> Result<Vec<JsonValue>, ModelError> {
    let marker = if deleted { Expr::col(Col::DeletedAt).is_not_null() } else { Expr::col(Col::DeletedAt).is_null() };
    let stmt = Query::select()
        .column(Asterisk)
        .from(table.iden())
        .and_where(marker)
        .order_by(Col::CreatedAt, Order::Asc)
        .order_by(Col::Id, Order::Asc)
        .to_owned();
    let rows = JsonValue::find_by_statement(db.get_database_backend().build(&stmt))
        .all(db)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{self, CreateCustomer};
    use crate::db::connect_in_memory;

    fn ids(rows: &[JsonValue]) -> Vec<String> {
        rows.iter().filter_map(|r| r["id"].as_str().map(str::to_string)).collect()
    }

    async fn new_customer(db: &DatabaseConnection, name: &str) -> anyhow::Result<customer::Model> {
        let input = CreateCustomer { name: name.into(), email: format!("{name}@example.com"), ..Default::default() };
        Ok(customer::create(db, input).await?)
    }

    #[test]
    fn table_names_round_trip() {
        for t in Table::ALL {
            assert_eq!(t.as_str().parse::<Table>().unwrap(), t);
        }
        assert!("customer; drop table user".parse::<Table>().is_err());
        let t: Table = serde_json::from_str("\"payment_invoice\"").unwrap();
        assert_eq!(t, Table::PaymentInvoice);
    }

    #[tokio::test]
    async fn delete_then_restore_moves_row_between_views() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let keep = new_customer(&db, "keep").await?;
        let gone = new_customer(&db, "gone").await?;

        assert!(soft_delete(&db, Table::Customer, &gone.id).await?);
        let active = ids(&get_active_records(&db, Table::Customer).await?);
        let deleted = ids(&get_deleted_records(&db, Table::Customer).await?);
        assert!(active.contains(&keep.id));
        assert!(!active.contains(&gone.id));
        assert_eq!(deleted, vec![gone.id.clone()]);

        assert!(restore(&db, Table::Customer, &gone.id).await?);
        let active = ids(&get_active_records(&db, Table::Customer).await?);
        let deleted = get_deleted_records(&db, Table::Customer).await?;
        assert!(active.contains(&gone.id));
        assert!(deleted.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn repeated_or_unknown_ids_do_not_match() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let c = new_customer(&db, "twice").await?;

        assert!(!restore(&db, Table::Customer, &c.id).await?);
        assert!(soft_delete(&db, Table::Customer, &c.id).await?);
        assert!(!soft_delete(&db, Table::Customer, &c.id).await?);
        assert!(!soft_delete(&db, Table::Customer, "abc").await?);
        assert!(!soft_delete(&db, Table::Service, &c.id).await?);

        // the row is still there, only marked
        let row = customer::Entity::find_by_id(c.id.clone()).one(&db).await?.unwrap();
        assert!(row.deleted_at.is_some());
        Ok(())
    }
}
