use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, IsolationLevel, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ModelError;
use crate::schema::{check_not_blank, validate_typed, FieldKind, FieldSpec, InputSchema, ValidationFailure};
use crate::soft_delete::{SoftDelete, Table};
use crate::user_credentials;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Credentials,
    Session,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Credentials => Entity::has_one(crate::user_credentials::Entity).into(),
            Relation::Session => Entity::has_many(crate::session::Entity).into(),
        }
    }
}

impl Related<crate::session::Entity> for Entity {
    fn to() -> RelationDef { Relation::Session.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    const TABLE: Table = Table::User;

    fn id_column() -> Column { Column::Id }
    fn deleted_at_column() -> Column { Column::DeletedAt }
    fn created_at_column() -> Column { Column::CreatedAt }
}

impl Model {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin.as_str() }

    pub fn is_active(&self) -> bool { self.status == UserStatus::Active.as_str() && self.deleted_at.is_none() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["admin", "member"];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
}

impl UserStatus {
    pub const NAMES: &'static [&'static str] = &["active", "disabled"];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Disabled => "disabled",
        }
    }
}

/// Registration payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl InputSchema for CreateUser {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("email", FieldKind::Str),
        FieldSpec::required("name", FieldKind::Str),
        FieldSpec::required("password", FieldKind::Str),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", Some(&self.name));
    }
}

/// Admin edit of an existing user; every field optional.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl InputSchema for UpdateUser {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("email", FieldKind::Str),
        FieldSpec::optional("name", FieldKind::Str),
        FieldSpec::optional("role", FieldKind::OneOf(Role::NAMES)),
        FieldSpec::optional("status", FieldKind::OneOf(UserStatus::NAMES)),
    ];

    fn check(&self, out: &mut ValidationFailure) {
        check_not_blank(out, "name", self.name.as_deref());
    }
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

pub async fn create<C: ConnectionTrait>(db: &C, input: &CreateUser, role: Role) -> Result<Model, ModelError> {
    validate_typed(input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        email: Set(normalize_email(&input.email)),
        name: Set(input.name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        status: Set(UserStatus::Active.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

/// Apply a validated partial update to `existing`.
pub async fn update(db: &DatabaseConnection, existing: Model, input: UpdateUser) -> Result<Model, ModelError> {
    validate_typed(&input)?;
    let mut am: ActiveModel = existing.into();
    if let Some(email) = input.email {
        am.email = Set(normalize_email(&email));
    }
    if let Some(name) = input.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(role) = input.role {
        am.role = Set(role.as_str().to_string());
    }
    if let Some(status) = input.status {
        am.status = Set(status.as_str().to_string());
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Any row with this email, deleted or not; emails stay unique across the trash.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(normalize_email(email))).one(db).await?)
}

pub async fn count_all<C: ConnectionTrait>(db: &C) -> Result<u64, ModelError> {
    Ok(Entity::find().count(db).await?)
}

/// Insert a user and their password hash in one serializable transaction.
/// The role is `Admin` only when no user row existed before.
pub async fn create_with_password(
    db: &DatabaseConnection,
    input: &CreateUser,
    password_hash: String,
    algorithm: &str,
) -> Result<Model, ModelError> {
    validate_typed(input)?;
    let txn = db.begin_with_config(Some(IsolationLevel::Serializable), None).await?;
    let role = if count_all(&txn).await? == 0 { Role::Admin } else { Role::Member };
    let user = create(&txn, input, role).await?;
    user_credentials::upsert_password(&txn, &user.id, password_hash, algorithm).await?;
    txn.commit().await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::schema::parse_input;
    use serde_json::json;

    #[test]
    fn registration_reports_every_missing_field() {
        let err = parse_input::<CreateUser>(json!({})).unwrap_err();
        assert!(err.has("email", "required"));
        assert!(err.has("name", "required"));
        assert!(err.has("password", "required"));
    }

    #[test]
    fn registration_constraints() {
        let err = parse_input::<CreateUser>(json!({"email": "nope", "name": " ", "password": "short"})).unwrap_err();
        assert!(err.has("email", "email"));
        assert!(err.has("name", "length"));
        assert!(err.has("password", "length"));
    }

    #[test]
    fn update_rejects_unknown_role_and_fields() {
        let err = parse_input::<UpdateUser>(json!({"role": "root", "password": "x"})).unwrap_err();
        assert!(err.has("role", "type"));
        assert!(err.has("password", "unknown_field"));

        let ok: UpdateUser = parse_input(json!({"role": "admin"})).unwrap();
        assert_eq!(ok.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn create_normalizes_and_updates() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let input = CreateUser { email: " Ann@Example.COM ".into(), name: "Ann".into(), password: "password1".into() };
        let u = create(&db, &input, Role::Member).await?;
        assert_eq!(u.email, "ann@example.com");
        assert!(u.is_active());
        assert!(!u.is_admin());
        assert_eq!(count_all(&db).await?, 1);
        assert!(find_by_email(&db, "ANN@example.com").await?.is_some());

        let changed = update(&db, u, UpdateUser { role: Some(Role::Admin), ..Default::default() }).await?;
        assert!(changed.is_admin());
        assert_eq!(changed.name, "Ann");
        Ok(())
    }

    #[tokio::test]
    async fn first_registration_is_admin_and_failures_roll_back() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let input = |email: &str| CreateUser { email: email.into(), name: "Ann".into(), password: "password1".into() };

        let blank = create_with_password(&db, &input("ghost@example.com"), " ".into(), "argon2").await;
        assert!(matches!(blank, Err(ModelError::Validation(_))));
        assert_eq!(count_all(&db).await?, 0);

        let first = create_with_password(&db, &input("first@example.com"), "hash-1".into(), "argon2").await?;
        let second = create_with_password(&db, &input("second@example.com"), "hash-2".into(), "argon2").await?;
        assert!(first.is_admin());
        assert!(!second.is_admin());
        assert!(user_credentials::find_by_user(&db, &second.id).await?.is_some());
        Ok(())
    }
}
