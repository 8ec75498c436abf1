use common::pagination::Paginated;
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::payment_invoice::{self, CreateInvoice, InvoiceStatus, UpdateInvoice};
use models::{bank_account, customer, service, Table};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud::{self, ListParams};
use crate::errors::ServiceError;

/// List filters for invoices.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoiceListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

/// Foreign keys must point at active rows.
async fn ensure_references(
    db: &DatabaseConnection,
    customer_id: Option<&str>,
    bank_account_id: Option<&str>,
    service_id: Option<&str>,
) -> Result<(), ServiceError> {
    if let Some(id) = customer_id {
        if crud::find_active::<customer::Entity>(db, id).await?.is_none() {
            return Err(ServiceError::invalid("customer_id", "invalid", "customer does not exist"));
        }
    }
    if let Some(id) = bank_account_id {
        if crud::find_active::<bank_account::Entity>(db, id).await?.is_none() {
            return Err(ServiceError::invalid("bank_account_id", "invalid", "bank account does not exist"));
        }
    }
    if let Some(id) = service_id {
        if crud::find_active::<service::Entity>(db, id).await?.is_none() {
            return Err(ServiceError::invalid("service_id", "invalid", "service does not exist"));
        }
    }
    Ok(())
}

/// Invoice numbers stay unique across the trash, since restore must not collide.
async fn ensure_number_free(db: &DatabaseConnection, number: &str, own_id: Option<&str>) -> Result<(), ServiceError> {
    match payment_invoice::find_by_number(db, number).await? {
        Some(existing) if Some(existing.id.as_str()) != own_id => {
            Err(ServiceError::Conflict(format!("invoice number {} already exists", number.trim())))
        }
        _ => Ok(()),
    }
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id, invoice_number = %input.invoice_number))]
pub async fn create_invoice(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    input: CreateInvoice,
) -> Result<payment_invoice::Model, ServiceError> {
    models::schema::validate_typed(&input)?;
    ensure_references(db, Some(&input.customer_id), input.bank_account_id.as_deref(), input.service_id.as_deref())
        .await?;
    ensure_number_free(db, &input.invoice_number, None).await?;
    let created = payment_invoice::create(db, input).await?;
    crud::log_activity(
        db,
        ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Create, Table::PaymentInvoice, &created.id)
            .describe(format!("invoice {}", created.invoice_number)),
    )
    .await?;
    info!(invoice_id = %created.id, "invoice_created");
    Ok(created)
}

pub async fn get_invoice(db: &DatabaseConnection, id: &str) -> Result<payment_invoice::Model, ServiceError> {
    crud::get_active::<payment_invoice::Entity>(db, id).await
}

/// Page through active invoices; `search` matches the invoice number.
pub async fn list_invoices(
    db: &DatabaseConnection,
    params: &InvoiceListParams,
) -> Result<Paginated<payment_invoice::Model>, ServiceError> {
    let base = ListParams { page: params.page, limit: params.limit, search: params.search.clone() };
    let mut filter = Condition::all();
    if let Some(term) = base.search_term() {
        filter = filter.add(crud::contains_ci(payment_invoice::Column::InvoiceNumber, term));
    }
    if let Some(status) = crud::non_empty(params.status.as_deref()) {
        let status = InvoiceStatus::parse(status).ok_or_else(|| {
            ServiceError::invalid("status", "type", format!("expected one of: {}", InvoiceStatus::NAMES.join(", ")))
        })?;
        filter = filter.add(payment_invoice::Column::Status.eq(status.as_str()));
    }
    if let Some(customer_id) = crud::non_empty(params.customer_id.as_deref()) {
        filter = filter.add(payment_invoice::Column::CustomerId.eq(customer_id));
    }
    crud::list_active::<payment_invoice::Entity>(db, base.pagination(), filter).await
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn update_invoice(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    id: &str,
    input: UpdateInvoice,
) -> Result<payment_invoice::Model, ServiceError> {
    let existing = get_invoice(db, id).await?;
    models::schema::validate_typed(&input)?;
    ensure_references(
        db,
        input.customer_id.as_deref(),
        input.bank_account_id.as_ref().and_then(|v| v.as_deref()),
        input.service_id.as_ref().and_then(|v| v.as_deref()),
    )
    .await?;
    if let Some(number) = &input.invoice_number {
        ensure_number_free(db, number, Some(id)).await?;
    }
    let status_change = input.status.filter(|s| s.as_str() != existing.status);
    let updated = payment_invoice::update(db, existing, input).await?;
    let mut log = ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Update, Table::PaymentInvoice, id);
    if let Some(status) = status_change {
        log = log.describe(format!("status -> {}", status.as_str()));
    }
    crud::log_activity(db, log).await?;
    info!(invoice_id = %id, status = %updated.status, "invoice_updated");
    Ok(updated)
}

pub async fn delete_invoice(db: &DatabaseConnection, ctx: &AuthContext, id: &str) -> Result<(), ServiceError> {
    crud::delete_record(db, Some(&ctx.user_id), Table::PaymentInvoice, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, get_db};
    use models::customer::CreateCustomer;
    use models::parse_input;
    use sea_orm::{EntityTrait, QueryOrder};
    use serde_json::{json, Value};

    async fn customer(db: &DatabaseConnection, name: &str) -> anyhow::Result<customer::Model> {
        let input = CreateCustomer { name: name.into(), email: format!("{name}@example.com"), ..Default::default() };
        Ok(customer::create(db, input).await?)
    }

    fn invoice(number: &str, customer_id: &str) -> Value {
        json!({
            "invoice_number": number,
            "customer_id": customer_id,
            "amount": 42000,
            "currency": "EUR",
            "issue_date": "2024-05-01T09:00:00+02:00",
            "due_date": "2024-05-31T09:00:00+02:00"
        })
    }

    #[tokio::test]
    async fn rejects_missing_references_and_duplicates() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let err = create_invoice(&db, &ctx, parse_input(invoice("INV-1", "nobody"))?).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref v) if v.has("customer_id", "invalid")));

        let c = customer(&db, "acme").await?;
        let mut with_service = invoice("INV-1", &c.id);
        with_service["service_id"] = json!("missing");
        let err = create_invoice(&db, &ctx, parse_input(with_service)?).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref v) if v.has("service_id", "invalid")));

        create_invoice(&db, &ctx, parse_input(invoice("INV-1", &c.id))?).await?;
        let dup = create_invoice(&db, &ctx, parse_input(invoice("INV-1", &c.id))?).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_status_and_customer() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let acme = customer(&db, "acme").await?;
        let globex = customer(&db, "globex").await?;
        let a1 = create_invoice(&db, &ctx, parse_input(invoice("A-1", &acme.id))?).await?;
        create_invoice(&db, &ctx, parse_input(invoice("A-2", &acme.id))?).await?;
        create_invoice(&db, &ctx, parse_input(invoice("G-1", &globex.id))?).await?;

        let patch: UpdateInvoice = parse_input(json!({"status": "sent"}))?;
        update_invoice(&db, &ctx, &a1.id, patch).await?;

        let by_customer = InvoiceListParams { customer_id: Some(acme.id.clone()), ..Default::default() };
        assert_eq!(list_invoices(&db, &by_customer).await?.meta.total_count, 2);
        let sent = InvoiceListParams { status: Some("sent".into()), ..Default::default() };
        let page = list_invoices(&db, &sent).await?;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, a1.id);
        let search = InvoiceListParams { search: Some("G-".into()), ..Default::default() };
        assert_eq!(list_invoices(&db, &search).await?.meta.total_count, 1);

        let bad = InvoiceListParams { status: Some("void".into()), ..Default::default() };
        assert!(matches!(list_invoices(&db, &bad).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn status_change_is_described_in_log() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let c = customer(&db, "acme").await?;
        let inv = create_invoice(&db, &ctx, parse_input(invoice("P-1", &c.id))?).await?;
        let patch: UpdateInvoice = parse_input(json!({"status": "paid"}))?;
        let paid = update_invoice(&db, &ctx, &inv.id, patch).await?;
        assert!(paid.paid_at.is_some());

        let last = models::activity_log::Entity::find()
            .order_by_desc(models::activity_log::Column::Id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(last.description.as_deref(), Some("status -> paid"));
        Ok(())
    }

    #[tokio::test]
    async fn renumbering_checks_uniqueness() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        let c = customer(&db, "acme").await?;
        let first = create_invoice(&db, &ctx, parse_input(invoice("R-1", &c.id))?).await?;
        create_invoice(&db, &ctx, parse_input(invoice("R-2", &c.id))?).await?;

        let same: UpdateInvoice = parse_input(json!({"invoice_number": "R-1"}))?;
        update_invoice(&db, &ctx, &first.id, same).await?;
        let clash: UpdateInvoice = parse_input(json!({"invoice_number": "R-2"}))?;
        assert!(matches!(update_invoice(&db, &ctx, &first.id, clash).await, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
