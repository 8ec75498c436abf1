//! Append-only audit trail. Rows are only ever inserted.

use chrono::Utc;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ModelError;
use crate::schema::{check_not_blank, validate_typed, FieldKind, FieldSpec, InputSchema, ValidationFailure};
use crate::soft_delete::Table;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<String>,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Restore,
    Login,
    Logout,
}

impl ActivityAction {
    pub const NAMES: &'static [&'static str] = &["create", "update", "delete", "restore", "login", "logout"];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Restore => "restore",
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
        }
    }
}

const TABLE_NAMES: &[&str] = &["user", "customer", "bank_account", "service", "payment_invoice"];

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ActivityLogInput {
    pub user_id: Option<String>,
    pub action: ActivityAction,
    pub entity: Table,
    #[validate(length(min = 1, max = 64))]
    pub entity_id: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl InputSchema for ActivityLogInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::nullable("user_id", FieldKind::Str),
        FieldSpec::required("action", FieldKind::OneOf(ActivityAction::NAMES)),
        FieldSpec::required("entity", FieldKind::OneOf(TABLE_NAMES)),
        FieldSpec::required("entity_id", FieldKind::Str),
        FieldSpec::nullable("description", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "entity_id", Some(&self.entity_id));
    }
}

impl ActivityLogInput {
    pub fn new(user_id: Option<&str>, action: ActivityAction, entity: Table, entity_id: &str) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            action,
            entity,
            entity_id: entity_id.to_string(),
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validate and append one entry.
pub async fn record(db: &DatabaseConnection, input: ActivityLogInput) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let am = ActiveModel {
        id: NotSet,
        user_id: Set(input.user_id),
        action: Set(input.action.as_str().to_string()),
        entity: Set(input.entity.as_str().to_string()),
        entity_id: Set(input.entity_id),
        description: Set(input.description),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}
