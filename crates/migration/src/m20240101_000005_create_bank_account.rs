//! Create `bank_account` table with optional FK to `customer`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BankAccount::Table)
                    .if_not_exists()
                    .col(string_len(BankAccount::Id, 36).primary_key())
                    .col(ColumnDef::new(BankAccount::CustomerId).string_len(36).null())
                    .col(string_len(BankAccount::BankName, 128).not_null())
                    .col(string_len(BankAccount::AccountName, 128).not_null())
                    .col(string_len(BankAccount::AccountNumber, 34).not_null())
                    .col(string_len(BankAccount::Currency, 3).not_null())
                    .col(ColumnDef::new(BankAccount::Swift).string_len(11).null())
                    .col(ColumnDef::new(BankAccount::Iban).string_len(34).null())
                    .col(boolean(BankAccount::IsDefault).not_null())
                    .col(timestamp_with_time_zone(BankAccount::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(BankAccount::UpdatedAt).not_null())
                    .col(ColumnDef::new(BankAccount::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bank_account_customer")
                            .from(BankAccount::Table, BankAccount::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BankAccount::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BankAccount {
    Table, Id, CustomerId, BankName, AccountName, AccountNumber, Currency, Swift, Iban, IsDefault,
    CreatedAt, UpdatedAt, DeletedAt,
}

#[derive(DeriveIden)]
enum Customer { Table, Id }
