//! Create `activity_log` table: append-only audit trail of mutating actions.
//!
//! `user_id` is nullable so entries survive for system actions; no FK so the
//! trail outlives the rows it describes.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(pk_auto(ActivityLog::Id))
                    .col(ColumnDef::new(ActivityLog::UserId).string_len(36).null())
                    .col(string_len(ActivityLog::Action, 16).not_null())
                    .col(string_len(ActivityLog::Entity, 32).not_null())
                    .col(string_len(ActivityLog::EntityId, 64).not_null())
                    .col(ColumnDef::new(ActivityLog::Description).string_len(500).null())
                    .col(timestamp_with_time_zone(ActivityLog::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActivityLog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ActivityLog { Table, Id, UserId, Action, Entity, EntityId, Description, CreatedAt }
