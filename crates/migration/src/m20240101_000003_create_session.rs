//! Create `session` table backing the signed session cookie.
//!
//! A session is live while `revoked_at` is null and `expires_at` is in the future.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(string_len(Session::Id, 36).primary_key())
                    .col(string_len(Session::UserId, 36).not_null())
                    .col(timestamp_with_time_zone(Session::ExpiresAt).not_null())
                    .col(
                        ColumnDef::new(Session::RevokedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Session::UserAgent)
                            .string_len(255)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Session::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_user")
                            .from(Session::Table, Session::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Session::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Session { Table, Id, UserId, ExpiresAt, RevokedAt, UserAgent, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
