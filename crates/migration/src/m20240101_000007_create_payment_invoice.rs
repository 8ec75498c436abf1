//! Create `payment_invoice` table with FKs to `customer`, `bank_account` and `service`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentInvoice::Table)
                    .if_not_exists()
                    .col(string_len(PaymentInvoice::Id, 36).primary_key())
                    .col(string_len(PaymentInvoice::InvoiceNumber, 64).unique_key().not_null())
                    .col(string_len(PaymentInvoice::CustomerId, 36).not_null())
                    .col(ColumnDef::new(PaymentInvoice::BankAccountId).string_len(36).null())
                    .col(ColumnDef::new(PaymentInvoice::ServiceId).string_len(36).null())
                    .col(integer(PaymentInvoice::Quantity).not_null())
                    .col(big_integer(PaymentInvoice::Amount).not_null())
                    .col(string_len(PaymentInvoice::Currency, 3).not_null())
                    .col(string_len(PaymentInvoice::Status, 16).not_null())
                    .col(timestamp_with_time_zone(PaymentInvoice::IssueDate).not_null())
                    .col(timestamp_with_time_zone(PaymentInvoice::DueDate).not_null())
                    .col(ColumnDef::new(PaymentInvoice::PaidAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(PaymentInvoice::Notes).text().null())
                    .col(timestamp_with_time_zone(PaymentInvoice::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PaymentInvoice::UpdatedAt).not_null())
                    .col(ColumnDef::new(PaymentInvoice::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_customer")
                            .from(PaymentInvoice::Table, PaymentInvoice::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_bank_account")
                            .from(PaymentInvoice::Table, PaymentInvoice::BankAccountId)
                            .to(BankAccount::Table, BankAccount::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_service")
                            .from(PaymentInvoice::Table, PaymentInvoice::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PaymentInvoice::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PaymentInvoice {
    Table, Id, InvoiceNumber, CustomerId, BankAccountId, ServiceId, Quantity, Amount, Currency, Status,
    IssueDate, DueDate, PaidAt, Notes, CreatedAt, UpdatedAt, DeletedAt,
}

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum BankAccount { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
