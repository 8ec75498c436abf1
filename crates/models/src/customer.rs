use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ModelError;
use crate::schema::{
    check_length, check_not_blank, double_option, validate_typed, FieldKind, FieldSpec, InputSchema,
    ValidationFailure,
};
use crate::soft_delete::{SoftDelete, Table};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    BankAccount,
    PaymentInvoice,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::BankAccount => Entity::has_many(crate::bank_account::Entity).into(),
            Relation::PaymentInvoice => Entity::has_many(crate::payment_invoice::Entity).into(),
        }
    }
}

impl Related<crate::bank_account::Entity> for Entity {
    fn to() -> RelationDef { Relation::BankAccount.def() }
}

impl Related<crate::payment_invoice::Entity> for Entity {
    fn to() -> RelationDef { Relation::PaymentInvoice.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    const TABLE: Table = Table::Customer;

    fn id_column() -> Column { Column::Id }
    fn deleted_at_column() -> Column { Column::DeletedAt }
    fn created_at_column() -> Column { Column::CreatedAt }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 128))]
    pub company: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 64))]
    pub tax_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl InputSchema for CreateCustomer {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", FieldKind::Str),
        FieldSpec::required("email", FieldKind::Str),
        FieldSpec::nullable("phone", FieldKind::Str),
        FieldSpec::nullable("company", FieldKind::Str),
        FieldSpec::nullable("address", FieldKind::Str),
        FieldSpec::nullable("tax_id", FieldKind::Str),
        FieldSpec::nullable("notes", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", Some(&self.name));
    }
}

/// Partial update; `null` clears an optional field.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tax_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl InputSchema for UpdateCustomer {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("name", FieldKind::Str),
        FieldSpec::optional("email", FieldKind::Str),
        FieldSpec::nullable("phone", FieldKind::Str),
        FieldSpec::nullable("company", FieldKind::Str),
        FieldSpec::nullable("address", FieldKind::Str),
        FieldSpec::nullable("tax_id", FieldKind::Str),
        FieldSpec::nullable("notes", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", self.name.as_deref());
        check_length(out, "phone", flat(&self.phone), 0, 32);
        check_length(out, "company", flat(&self.company), 0, 128);
        check_length(out, "address", flat(&self.address), 0, 255);
        check_length(out, "tax_id", flat(&self.tax_id), 0, 64);
        check_length(out, "notes", flat(&self.notes), 0, 2000);
    }
}

pub(crate) fn flat(v: &Option<Option<String>>) -> Option<&str> {
    v.as_ref().and_then(|inner| inner.as_deref())
}

pub async fn create(db: &DatabaseConnection, input: CreateCustomer) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(input.name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(input.phone),
        company: Set(input.company),
        address: Set(input.address),
        tax_id: Set(input.tax_id),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, existing: Model, input: UpdateCustomer) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let mut am: ActiveModel = existing.into();
    if let Some(name) = input.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(email) = input.email {
        am.email = Set(email.trim().to_string());
    }
    if let Some(phone) = input.phone {
        am.phone = Set(phone);
    }
    if let Some(company) = input.company {
        am.company = Set(company);
    }
    if let Some(address) = input.address {
        am.address = Set(address);
    }
    if let Some(tax_id) = input.tax_id {
        am.tax_id = Set(tax_id);
    }
    if let Some(notes) = input.notes {
        am.notes = Set(notes);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::schema::parse_input;
    use serde_json::json;

    #[test]
    fn create_requires_name_and_email() {
        let err = parse_input::<CreateCustomer>(json!({"phone": "123"})).unwrap_err();
        assert!(err.has("name", "required"));
        assert!(err.has("email", "required"));
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn create_rejects_bad_values() {
        let err = parse_input::<CreateCustomer>(json!({
            "name": "",
            "email": "not-an-email",
            "phone": "x".repeat(33),
            "nickname": "acme"
        }))
        .unwrap_err();
        assert!(err.has("nickname", "unknown_field"));
        // structural problems are reported before constraints run
        assert_eq!(err.violations.len(), 1);

        let err = parse_input::<CreateCustomer>(json!({"name": "", "email": "nope", "phone": "x".repeat(33)})).unwrap_err();
        assert!(err.has("name", "length"));
        assert!(err.has("email", "email"));
        assert!(err.has("phone", "length"));
    }

    #[test]
    fn update_distinguishes_absent_and_null() {
        let u: UpdateCustomer = parse_input(json!({"phone": null, "company": "Acme"})).unwrap();
        assert_eq!(u.phone, Some(None));
        assert_eq!(u.company, Some(Some("Acme".into())));
        assert_eq!(u.notes, None);

        let err = parse_input::<UpdateCustomer>(json!({"tax_id": "x".repeat(65)})).unwrap_err();
        assert!(err.has("tax_id", "length"));
        let err = parse_input::<UpdateCustomer>(json!({"name": null})).unwrap_err();
        assert!(err.has("name", "type"));
    }

    #[tokio::test]
    async fn update_clears_and_keeps_fields() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let input = CreateCustomer {
            name: "Acme".into(),
            email: "billing@acme.test".into(),
            phone: Some("+1 555".into()),
            company: Some("Acme Inc".into()),
            ..Default::default()
        };
        let c = create(&db, input).await?;
        let patch: UpdateCustomer = parse_input(json!({"phone": null, "notes": "vip"}))?;
        let c = update(&db, c, patch).await?;
        assert_eq!(c.phone, None);
        assert_eq!(c.company.as_deref(), Some("Acme Inc"));
        assert_eq!(c.notes.as_deref(), Some("vip"));
        assert!(c.updated_at >= c.created_at);
        Ok(())
    }
}
