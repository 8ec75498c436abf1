use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Session lookup by user (logout-everywhere, admin listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_user")
                    .table(Session::Table)
                    .col(Session::UserId)
                    .to_owned(),
            )
            .await?;

        // Soft-delete filters: every active/deleted query hits deleted_at
        for (name, table) in [
            ("idx_user_deleted_at", Alias::new("user")),
            ("idx_customer_deleted_at", Alias::new("customer")),
            ("idx_bank_account_deleted_at", Alias::new("bank_account")),
            ("idx_service_deleted_at", Alias::new("service")),
            ("idx_payment_invoice_deleted_at", Alias::new("payment_invoice")),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(Alias::new("deleted_at"))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_bank_account_customer")
                    .table(BankAccount::Table)
                    .col(BankAccount::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_customer")
                    .table(PaymentInvoice::Table)
                    .col(PaymentInvoice::CustomerId)
                    .to_owned(),
            )
            .await?;

        // ActivityLog: entity lookup and time ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_entity")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Entity)
                    .col(ActivityLog::EntityId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_activity_log_created_at", "activity_log"),
            ("idx_activity_log_entity", "activity_log"),
            ("idx_invoice_customer", "payment_invoice"),
            ("idx_bank_account_customer", "bank_account"),
            ("idx_payment_invoice_deleted_at", "payment_invoice"),
            ("idx_service_deleted_at", "service"),
            ("idx_bank_account_deleted_at", "bank_account"),
            ("idx_customer_deleted_at", "customer"),
            ("idx_user_deleted_at", "user"),
            ("idx_session_user", "session"),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Session { Table, UserId }

#[derive(DeriveIden)]
enum BankAccount { Table, CustomerId }

#[derive(DeriveIden)]
enum PaymentInvoice { Table, CustomerId }

#[derive(DeriveIden)]
enum ActivityLog { Table, Entity, EntityId, CreatedAt }
