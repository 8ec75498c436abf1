//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_session;
mod m20240101_000004_create_customer;
mod m20240101_000005_create_bank_account;
mod m20240101_000006_create_service;
mod m20240101_000007_create_payment_invoice;
mod m20240101_000008_create_activity_log;
mod m20240101_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_session::Migration),
            Box::new(m20240101_000004_create_customer::Migration),
            Box::new(m20240101_000005_create_bank_account::Migration),
            Box::new(m20240101_000006_create_service::Migration),
            Box::new(m20240101_000007_create_payment_invoice::Migration),
            Box::new(m20240101_000008_create_activity_log::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000009_add_indexes::Migration),
        ]
    }
}
