use common::pagination::Paginated;
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::bank_account::{self, CreateBankAccount, UpdateBankAccount};
use models::{customer, Table};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud::{self, ListParams};
use crate::errors::ServiceError;

/// List filters for bank accounts.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BankAccountListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub customer_id: Option<String>,
}

impl BankAccountListParams {
    fn base(&self) -> ListParams {
        ListParams { page: self.page, limit: self.limit, search: self.search.clone() }
    }
}

async fn ensure_customer(db: &DatabaseConnection, customer_id: Option<&str>) -> Result<(), ServiceError> {
    if let Some(id) = customer_id {
        if crud::find_active::<customer::Entity>(db, id).await?.is_none() {
            return Err(ServiceError::invalid("customer_id", "invalid", "customer does not exist"));
        }
    }
    Ok(())
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn create_bank_account(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    input: CreateBankAccount,
) -> Result<bank_account::Model, ServiceError> {
    ensure_customer(db, input.customer_id.as_deref()).await?;
    let created = bank_account::create(db, input).await?;
    if created.is_default {
        bank_account::clear_other_defaults(db, created.customer_id.as_deref(), &created.id).await?;
    }
    crud::log_activity(
        db,
        ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Create, Table::BankAccount, &created.id),
    )
    .await?;
    info!(bank_account_id = %created.id, "bank_account_created");
    Ok(created)
}

pub async fn get_bank_account(db: &DatabaseConnection, id: &str) -> Result<bank_account::Model, ServiceError> {
    crud::get_active::<bank_account::Entity>(db, id).await
}

/// Page through active accounts; `search` matches bank name, account name or number.
pub async fn list_bank_accounts(
    db: &DatabaseConnection,
    params: &BankAccountListParams,
) -> Result<Paginated<bank_account::Model>, ServiceError> {
    let base = params.base();
    let mut filter = Condition::all();
    if let Some(term) = base.search_term() {
        filter = filter.add(
            Condition::any()
                .add(crud::contains_ci(bank_account::Column::BankName, term))
                .add(crud::contains_ci(bank_account::Column::AccountName, term))
                .add(crud::contains_ci(bank_account::Column::AccountNumber, term)),
        );
    }
    if let Some(customer_id) = crud::non_empty(params.customer_id.as_deref()) {
        filter = filter.add(bank_account::Column::CustomerId.eq(customer_id));
    }
    crud::list_active::<bank_account::Entity>(db, base.pagination(), filter).await
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn update_bank_account(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    id: &str,
    input: UpdateBankAccount,
) -> Result<bank_account::Model, ServiceError> {
    let existing = get_bank_account(db, id).await?;
    if let Some(customer_id) = &input.customer_id {
        ensure_customer(db, customer_id.as_deref()).await?;
    }
    let updated = bank_account::update(db, existing, input).await?;
    if updated.is_default {
        bank_account::clear_other_defaults(db, updated.customer_id.as_deref(), &updated.id).await?;
    }
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Update, Table::BankAccount, id))
        .await?;
    info!(bank_account_id = %id, "bank_account_updated");
    Ok(updated)
}

pub async fn delete_bank_account(db: &DatabaseConnection, ctx: &AuthContext, id: &str) -> Result<(), ServiceError> {
    crud::delete_record(db, Some(&ctx.user_id), Table::BankAccount, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, get_db};
    use models::customer::CreateCustomer;
    use models::parse_input;
    use serde_json::json;

    fn account(customer_id: Option<&str>, number: &str, is_default: bool) -> anyhow::Result<CreateBankAccount> {
        Ok(parse_input(json!({
            "bank_name": "First Bank",
            "account_name": "Acme",
            "account_number": number,
            "currency": "EUR",
            "customer_id": customer_id,
            "is_default": is_default
        }))?)
    }

    #[tokio::test]
    async fn unknown_customer_is_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let err = create_bank_account(&db, &admin_ctx(), account(Some("missing"), "1234", false)?).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref v) if v.has("customer_id", "invalid")));
        Ok(())
    }

    #[tokio::test]
    async fn default_flag_moves_between_accounts() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let c = customer::create(&db, CreateCustomer { name: "Acme".into(), email: "a@acme.test".into(), ..Default::default() })
            .await?;

        let a = create_bank_account(&db, &ctx, account(Some(&c.id), "1111", true)?).await?;
        let b = create_bank_account(&db, &ctx, account(Some(&c.id), "2222", true)?).await?;
        assert!(!get_bank_account(&db, &a.id).await?.is_default);
        assert!(get_bank_account(&db, &b.id).await?.is_default);

        let patch: UpdateBankAccount = parse_input(json!({"is_default": true}))?;
        update_bank_account(&db, &ctx, &a.id, patch).await?;
        assert!(!get_bank_account(&db, &b.id).await?.is_default);

        let params = BankAccountListParams { customer_id: Some(c.id.clone()), ..Default::default() };
        assert_eq!(list_bank_accounts(&db, &params).await?.meta.total_count, 2);
        let params = BankAccountListParams { search: Some("2222".into()), ..Default::default() };
        assert_eq!(list_bank_accounts(&db, &params).await?.data[0].id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn deleted_account_is_gone() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let a = create_bank_account(&db, &ctx, account(None, "9999", false)?).await?;
        delete_bank_account(&db, &ctx, &a.id).await?;
        assert!(matches!(get_bank_account(&db, &a.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
