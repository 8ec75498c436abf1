//! Billable services offered to customers. Prices are in minor currency units.

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::customer::flat;
use crate::errors::ModelError;
use crate::schema::{
    check_length, check_not_blank, double_option, validate_typed, FieldKind, FieldSpec, InputSchema, ValidationFailure,
};
use crate::soft_delete::{SoftDelete, Table};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub unit_price: i64,
    pub tax_percent: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    PaymentInvoice,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PaymentInvoice => Entity::has_many(crate::payment_invoice::Entity).into(),
        }
    }
}

impl Related<crate::payment_invoice::Entity> for Entity {
    fn to() -> RelationDef { Relation::PaymentInvoice.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    const TABLE: Table = Table::Service;

    fn id_column() -> Column { Column::Id }
    fn deleted_at_column() -> Column { Column::DeletedAt }
    fn created_at_column() -> Column { Column::CreatedAt }
}

fn default_active() -> bool { true }

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateService {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    #[validate(range(min = 0))]
    pub unit_price: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub tax_percent: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl InputSchema for CreateService {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", FieldKind::Str),
        FieldSpec::nullable("description", FieldKind::Str),
        FieldSpec::required("unit", FieldKind::Str),
        FieldSpec::required("unit_price", FieldKind::Int),
        FieldSpec::optional("tax_percent", FieldKind::Int),
        FieldSpec::optional("active", FieldKind::Bool),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", Some(&self.name));
        check_not_blank(out, "unit", Some(&self.unit));
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateService {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub unit_price: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub tax_percent: Option<i32>,
    pub active: Option<bool>,
}

impl InputSchema for UpdateService {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("name", FieldKind::Str),
        FieldSpec::nullable("description", FieldKind::Str),
        FieldSpec::optional("unit", FieldKind::Str),
        FieldSpec::optional("unit_price", FieldKind::Int),
        FieldSpec::optional("tax_percent", FieldKind::Int),
        FieldSpec::optional("active", FieldKind::Bool),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", self.name.as_deref());
        check_not_blank(out, "unit", self.unit.as_deref());
        check_length(out, "description", flat(&self.description), 0, 2000);
    }
}

pub async fn create(db: &DatabaseConnection, input: CreateService) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        unit: Set(input.unit.trim().to_string()),
        unit_price: Set(input.unit_price),
        tax_percent: Set(input.tax_percent),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub async fn update(db: &DatabaseConnection, existing: Model, input: UpdateService) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let mut am: ActiveModel = existing.into();
    if let Some(v) = input.name {
        am.name = Set(v.trim().to_string());
    }
    if let Some(v) = input.description {
        am.description = Set(v);
    }
    if let Some(v) = input.unit {
        am.unit = Set(v.trim().to_string());
    }
    if let Some(v) = input.unit_price {
        am.unit_price = Set(v);
    }
    if let Some(v) = input.tax_percent {
        am.tax_percent = Set(v);
    }
    if let Some(v) = input.active {
        am.active = Set(v);
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
    fn defaults_apply_when_omitted() {
        let s: CreateService = parse_input(json!({"name": "Consulting", "unit": "hour", "unit_price": 12000})).unwrap();
        assert_eq!(s.tax_percent, 0);
        assert!(s.active);
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let err = parse_input::<CreateService>(json!({
            "name": "Consulting", "unit": "hour", "unit_price": -1, "tax_percent": 101
        }))
        .unwrap_err();
        assert!(err.has("unit_price", "range"));
        assert!(err.has("tax_percent", "range"));

        let err = parse_input::<CreateService>(json!({"name": "X", "unit": "h", "unit_price": 1.5})).unwrap_err();
        assert!(err.has("unit_price", "type"));
    }

    #[tokio::test]
    async fn update_toggles_active() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let input: CreateService = parse_input(json!({"name": "Hosting", "unit": "month", "unit_price": 500}))?;
        let s = create(&db, input).await?;
        let s = update(&db, s, UpdateService { active: Some(false), ..Default::default() }).await?;
        assert!(!s.active);
        assert_eq!(s.unit_price, 500);
        Ok(())
    }
}
