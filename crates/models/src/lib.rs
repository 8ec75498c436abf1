pub mod errors;
pub mod db;
pub mod schema;
pub mod soft_delete;
pub mod activity_log;
pub mod user;
pub mod user_credentials;
pub mod session;
pub mod customer;
pub mod bank_account;
pub mod service;
pub mod payment_invoice;

pub use errors::ModelError;
pub use schema::{parse_input, InputSchema, ValidationFailure};
pub use soft_delete::{SoftDelete, Table};

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Statement};

    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn migrations_create_every_table() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        for table in ["user", "user_credentials", "session", "customer", "bank_account", "service", "payment_invoice", "activity_log"] {
            let stmt = Statement::from_string(
                db.get_database_backend(),
                format!("SELECT COUNT(*) AS n FROM \"{table}\""),
            );
            assert!(db.query_one(stmt).await?.is_some(), "table {table} missing");
        }
        Ok(())
    }
}
