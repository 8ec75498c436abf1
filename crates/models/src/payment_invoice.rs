//! Payment invoices issued to customers. Amounts are in minor currency units.

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::customer::flat;
use crate::errors::ModelError;
use crate::schema::{
    check_format, check_length, check_not_blank, double_option, is_currency, validate_typed, FieldKind, FieldSpec,
    InputSchema, ValidationFailure,
};
use crate::soft_delete::{SoftDelete, Table};
use crate::{bank_account, customer, service};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub customer_id: String,
    pub bank_account_id: Option<String>,
    pub service_id: Option<String>,
    pub quantity: i32,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub issue_date: DateTimeWithTimeZone,
    pub due_date: DateTimeWithTimeZone,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    BankAccount,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity)
                .from(Column::CustomerId)
                .to(customer::Column::Id)
                .into(),
            Relation::BankAccount => Entity::belongs_to(bank_account::Entity)
                .from(Column::BankAccountId)
                .to(bank_account::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl Related<customer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl Related<bank_account::Entity> for Entity {
    fn to() -> RelationDef { Relation::BankAccount.def() }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    const TABLE: Table = Table::PaymentInvoice;

    fn id_column() -> Column { Column::Id }
    fn deleted_at_column() -> Column { Column::DeletedAt }
    fn created_at_column() -> Column { Column::CreatedAt }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const NAMES: &'static [&'static str] = &["draft", "sent", "paid", "overdue", "cancelled"];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            "cancelled" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

const CURRENCY_MSG: &str = "must be a 3-letter uppercase currency code";
const DUE_DATE_MSG: &str = "must not be before issue_date";

fn default_quantity() -> i32 { 1 }

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoice {
    #[validate(length(min = 1, max = 64))]
    pub invoice_number: String,
    #[validate(length(min = 1, max = 36))]
    pub customer_id: String,
    #[validate(length(min = 1, max = 36))]
    pub bank_account_id: Option<String>,
    #[validate(length(min = 1, max = 36))]
    pub service_id: Option<String>,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub issue_date: DateTimeWithTimeZone,
    pub due_date: DateTimeWithTimeZone,
    pub paid_at: Option<DateTimeWithTimeZone>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl InputSchema for CreateInvoice {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("invoice_number", FieldKind::Str),
        FieldSpec::required("customer_id", FieldKind::Str),
        FieldSpec::nullable("bank_account_id", FieldKind::Str),
        FieldSpec::nullable("service_id", FieldKind::Str),
        FieldSpec::optional("quantity", FieldKind::Int),
        FieldSpec::required("amount", FieldKind::Int),
        FieldSpec::required("currency", FieldKind::Str),
        FieldSpec::optional("status", FieldKind::OneOf(InvoiceStatus::NAMES)),
        FieldSpec::required("issue_date", FieldKind::Timestamp),
        FieldSpec::required("due_date", FieldKind::Timestamp),
        FieldSpec::nullable("paid_at", FieldKind::Timestamp),
        FieldSpec::nullable("notes", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "invoice_number", Some(&self.invoice_number));
        check_format(out, "currency", Some(&self.currency), is_currency, CURRENCY_MSG);
        if self.due_date < self.issue_date {
            out.push("due_date", "range", DUE_DATE_MSG);
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoice {
    #[validate(length(min = 1, max = 64))]
    pub invoice_number: Option<String>,
    #[validate(length(min = 1, max = 36))]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bank_account_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub service_id: Option<Option<String>>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub issue_date: Option<DateTimeWithTimeZone>,
    pub due_date: Option<DateTimeWithTimeZone>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_at: Option<Option<DateTimeWithTimeZone>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl InputSchema for UpdateInvoice {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("invoice_number", FieldKind::Str),
        FieldSpec::optional("customer_id", FieldKind::Str),
        FieldSpec::nullable("bank_account_id", FieldKind::Str),
        FieldSpec::nullable("service_id", FieldKind::Str),
        FieldSpec::optional("quantity", FieldKind::Int),
        FieldSpec::optional("amount", FieldKind::Int),
        FieldSpec::optional("currency", FieldKind::Str),
        FieldSpec::optional("status", FieldKind::OneOf(InvoiceStatus::NAMES)),
        FieldSpec::optional("issue_date", FieldKind::Timestamp),
        FieldSpec::optional("due_date", FieldKind::Timestamp),
        FieldSpec::nullable("paid_at", FieldKind::Timestamp),
        FieldSpec::nullable("notes", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "invoice_number", self.invoice_number.as_deref());
        check_format(out, "currency", self.currency.as_deref(), is_currency, CURRENCY_MSG);
        check_length(out, "bank_account_id", flat(&self.bank_account_id), 1, 36);
        check_length(out, "service_id", flat(&self.service_id), 1, 36);
        check_length(out, "notes", flat(&self.notes), 0, 2000);
        if let (Some(issue), Some(due)) = (self.issue_date, self.due_date) {
            if due < issue {
                out.push("due_date", "range", DUE_DATE_MSG);
            }
        }
    }
}

pub async fn create(db: &DatabaseConnection, input: CreateInvoice) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let paid_at = match (input.status, input.paid_at) {
        (InvoiceStatus::Paid, None) => Some(now),
        (_, paid_at) => paid_at,
    };
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        invoice_number: Set(input.invoice_number.trim().to_string()),
        customer_id: Set(input.customer_id),
        bank_account_id: Set(input.bank_account_id),
        service_id: Set(input.service_id),
        quantity: Set(input.quantity),
        amount: Set(input.amount),
        currency: Set(input.currency),
        status: Set(input.status.as_str().to_string()),
        issue_date: Set(input.issue_date),
        due_date: Set(input.due_date),
        paid_at: Set(paid_at),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

/// Apply a partial update. The date ordering is checked against the merged
/// record, so moving only one of the two dates is still validated.
pub async fn update(db: &DatabaseConnection, existing: Model, input: UpdateInvoice) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let issue = input.issue_date.unwrap_or(existing.issue_date);
    let due = input.due_date.unwrap_or(existing.due_date);
    if due < issue {
        return Err(ModelError::invalid("due_date", "range", DUE_DATE_MSG));
    }
    let becomes_paid = input.status == Some(InvoiceStatus::Paid) && existing.paid_at.is_none();

    let mut am: ActiveModel = existing.into();
    if let Some(v) = input.invoice_number {
        am.invoice_number = Set(v.trim().to_string());
    }
    if let Some(v) = input.customer_id {
        am.customer_id = Set(v);
    }
    if let Some(v) = input.bank_account_id {
        am.bank_account_id = Set(v);
    }
    if let Some(v) = input.service_id {
        am.service_id = Set(v);
    }
    if let Some(v) = input.quantity {
        am.quantity = Set(v);
    }
    if let Some(v) = input.amount {
        am.amount = Set(v);
    }
    if let Some(v) = input.currency {
        am.currency = Set(v);
    }
    if let Some(v) = input.status {
        am.status = Set(v.as_str().to_string());
    }
    am.issue_date = Set(issue);
    am.due_date = Set(due);
    match input.paid_at {
        Some(v) => am.paid_at = Set(v),
        None if becomes_paid => am.paid_at = Set(Some(Utc::now().into())),
        None => {}
    }
    if let Some(v) = input.notes {
        am.notes = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn find_by_number(db: &DatabaseConnection, invoice_number: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::InvoiceNumber.eq(invoice_number.trim())).one(db).await?)
}
