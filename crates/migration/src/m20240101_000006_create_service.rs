//! Create `service` table: billable services with a unit price in minor currency units.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(string_len(Service::Id, 36).primary_key())
                    .col(string_len(Service::Name, 128).not_null())
                    .col(ColumnDef::new(Service::Description).text().null())
                    .col(string_len(Service::Unit, 32).not_null())
                    .col(big_integer(Service::UnitPrice).not_null())
                    .col(integer(Service::TaxPercent).not_null())
                    .col(boolean(Service::Active).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .col(ColumnDef::new(Service::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, Name, Description, Unit, UnitPrice, TaxPercent, Active, CreatedAt, UpdatedAt, DeletedAt }
