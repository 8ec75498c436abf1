use chrono::Utc;
use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::customer::{self, flat};
use crate::errors::ModelError;
use crate::schema::{
    check_format, check_length, check_not_blank, double_option, is_currency, is_digits, validate_typed, FieldKind,
    FieldSpec, InputSchema, ValidationFailure,
};
use crate::soft_delete::{SoftDelete, Table};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: Option<String>,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub currency: String,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity)
                .from(Column::CustomerId)
                .to(customer::Column::Id)
                .into(),
        }
    }
}

impl Related<customer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    const TABLE: Table = Table::BankAccount;

    fn id_column() -> Column { Column::Id }
    fn deleted_at_column() -> Column { Column::DeletedAt }
    fn created_at_column() -> Column { Column::CreatedAt }
}

/// SWIFT/BIC: 8 or 11 ASCII alphanumerics.
pub fn is_swift(value: &str) -> bool {
    matches!(value.len(), 8 | 11) && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_iban(value: &str) -> bool {
    !value.is_empty() && value.len() <= 34 && value.chars().all(|c| c.is_ascii_alphanumeric())
}

const ACCOUNT_NUMBER_MSG: &str = "must contain digits only";
const CURRENCY_MSG: &str = "must be a 3-letter uppercase currency code";
const SWIFT_MSG: &str = "must be 8 or 11 letters or digits";
const IBAN_MSG: &str = "must be at most 34 letters or digits";

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateBankAccount {
    #[validate(length(min = 1, max = 128))]
    pub bank_name: String,
    #[validate(length(min = 1, max = 128))]
    pub account_name: String,
    #[validate(length(min = 4, max = 34))]
    pub account_number: String,
    pub currency: String,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl InputSchema for CreateBankAccount {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("bank_name", FieldKind::Str),
        FieldSpec::required("account_name", FieldKind::Str),
        FieldSpec::required("account_number", FieldKind::Str),
        FieldSpec::required("currency", FieldKind::Str),
        FieldSpec::nullable("swift", FieldKind::Str),
        FieldSpec::nullable("iban", FieldKind::Str),
        FieldSpec::nullable("customer_id", FieldKind::Str),
        FieldSpec::optional("is_default", FieldKind::Bool),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "bank_name", Some(&self.bank_name));
        check_not_blank(out, "account_name", Some(&self.account_name));
        check_format(out, "account_number", Some(&self.account_number), is_digits, ACCOUNT_NUMBER_MSG);
        check_format(out, "currency", Some(&self.currency), is_currency, CURRENCY_MSG);
        check_format(out, "swift", self.swift.as_deref(), is_swift, SWIFT_MSG);
        check_format(out, "iban", self.iban.as_deref(), is_iban, IBAN_MSG);
        check_length(out, "customer_id", self.customer_id.as_deref(), 1, 36);
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateBankAccount {
    #[validate(length(min = 1, max = 128))]
    pub bank_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub account_name: Option<String>,
    #[validate(length(min = 4, max = 34))]
    pub account_number: Option<String>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub swift: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub iban: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub customer_id: Option<Option<String>>,
    pub is_default: Option<bool>,
}

impl InputSchema for UpdateBankAccount {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("bank_name", FieldKind::Str),
        FieldSpec::optional("account_name", FieldKind::Str),
        FieldSpec::optional("account_number", FieldKind::Str),
        FieldSpec::optional("currency", FieldKind::Str),
        FieldSpec::nullable("swift", FieldKind::Str),
        FieldSpec::nullable("iban", FieldKind::Str),
        FieldSpec::nullable("customer_id", FieldKind::Str),
        FieldSpec::optional("is_default", FieldKind::Bool),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "bank_name", self.bank_name.as_deref());
        check_not_blank(out, "account_name", self.account_name.as_deref());
        check_format(out, "account_number", self.account_number.as_deref(), is_digits, ACCOUNT_NUMBER_MSG);
        check_format(out, "currency", self.currency.as_deref(), is_currency, CURRENCY_MSG);
        check_format(out, "swift", flat(&self.swift), is_swift, SWIFT_MSG);
        check_format(out, "iban", flat(&self.iban), is_iban, IBAN_MSG);
        check_length(out, "customer_id", flat(&self.customer_id), 1, 36);
    }
}

pub async fn create(db: &DatabaseConnection, input: CreateBankAccount) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        customer_id: Set(input.customer_id),
        bank_name: Set(input.bank_name.trim().to_string()),
        account_name: Set(input.account_name.trim().to_string()),
        account_number: Set(input.account_number),
        currency: Set(input.currency),
        swift: Set(input.swift),
        iban: Set(input.iban),
        is_default: Set(input.is_default),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, existing: Model, input: UpdateBankAccount) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let mut am: ActiveModel = existing.into();
    if let Some(v) = input.bank_name {
        am.bank_name = Set(v.trim().to_string());
    }
    if let Some(v) = input.account_name {
        am.account_name = Set(v.trim().to_string());
    }
    if let Some(v) = input.account_number {
        am.account_number = Set(v);
    }
    if let Some(v) = input.currency {
        am.currency = Set(v);
    }
    if let Some(v) = input.swift {
        am.swift = Set(v);
    }
    if let Some(v) = input.iban {
        am.iban = Set(v);
    }
    if let Some(v) = input.customer_id {
        am.customer_id = Set(v);
    }
    if let Some(v) = input.is_default {
        am.is_default = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Clear `is_default` on every active account sharing `customer_id` except `keep_id`.
pub async fn clear_other_defaults(
    db: &DatabaseConnection,
    customer_id: Option<&str>,
    keep_id: &str,
) -> Result<u64, ModelError> {
    let owner = match customer_id {
        Some(id) => Column::CustomerId.eq(id),
        None => Column::CustomerId.is_null(),
    };
    let res = Entity::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .filter(owner)
        .filter(Column::Id.ne(keep_id))
        .filter(Column::IsDefault.eq(true))
        .filter(Column::DeletedAt.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::schema::parse_input;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "bank_name": "First Bank",
            "account_name": "Acme Ltd",
            "account_number": "00123456",
            "currency": "EUR"
        })
    }

    #[test]
    fn accepts_minimal_payload() {
        let a: CreateBankAccount = parse_input(valid()).unwrap();
        assert!(!a.is_default);
        assert_eq!(a.swift, None);
    }

    #[test]
    fn rejects_malformed_numbers_and_codes() {
        let mut v = valid();
        v["account_number"] = json!("12-34-56");
        v["currency"] = json!("euro");
        v["swift"] = json!("ABC");
        let err = parse_input::<CreateBankAccount>(v).unwrap_err();
        assert!(err.has("account_number", "format"));
        assert!(err.has("currency", "format"));
        assert!(err.has("swift", "format"));
    }

    #[test]
    fn swift_lengths() {
        assert!(is_swift("DEUTDEFF"));
        assert!(is_swift("DEUTDEFF500"));
        assert!(!is_swift("DEUTDEFF5"));
    }

    #[test]
    fn update_validates_present_fields_only() {
        let ok: UpdateBankAccount = parse_input(json!({"swift": null, "is_default": true})).unwrap();
        assert_eq!(ok.swift, Some(None));
        let err = parse_input::<UpdateBankAccount>(json!({"currency": "usd", "account_number": "12"})).unwrap_err();
        assert!(err.has("currency", "format"));
        assert!(err.has("account_number", "length"));
    }

    #[tokio::test]
    async fn only_one_default_per_owner() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let first: CreateBankAccount = parse_input(json!({
            "bank_name": "A", "account_name": "Acme", "account_number": "1111", "currency": "EUR", "is_default": true
        }))?;
        let second: CreateBankAccount = parse_input(json!({
            "bank_name": "B", "account_name": "Acme", "account_number": "2222", "currency": "EUR", "is_default": true
        }))?;
        let a = create(&db, first).await?;
        let b = create(&db, second).await?;
        assert_eq!(clear_other_defaults(&db, None, &b.id).await?, 1);

        let a = Entity::find_by_id(a.id).one(&db).await?.unwrap();
        assert!(!a.is_default);
        Ok(())
    }
}
