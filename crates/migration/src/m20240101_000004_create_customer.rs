//! Create `customer` table (master data, soft-deletable).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(string_len(Customer::Id, 36).primary_key())
                    .col(string_len(Customer::Name, 128).not_null())
                    .col(string_len(Customer::Email, 255).not_null())
                    .col(ColumnDef::new(Customer::Phone).string_len(32).null())
                    .col(ColumnDef::new(Customer::Company).string_len(128).null())
                    .col(ColumnDef::new(Customer::Address).string_len(255).null())
                    .col(ColumnDef::new(Customer::TaxId).string_len(64).null())
                    .col(ColumnDef::new(Customer::Notes).text().null())
                    .col(timestamp_with_time_zone(Customer::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Customer::UpdatedAt).not_null())
                    .col(ColumnDef::new(Customer::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, Name, Email, Phone, Company, Address, TaxId, Notes, CreatedAt, UpdatedAt, DeletedAt }
