//! Server-side login sessions. The cookie only carries the session id; a
//! session is live while it is neither revoked nor expired.

use chrono::{Duration, Utc};
use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTimeWithTimeZone,
    pub revoked_at: Option<DateTimeWithTimeZone>,
    pub user_agent: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_live(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: &str,
    ttl: Duration,
    user_agent: Option<String>,
) -> Result<Model, ModelError> {
    let now = Utc::now();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        expires_at: Set((now + ttl).into()),
        revoked_at: Set(None),
        user_agent: Set(user_agent.map(|ua| ua.chars().take(255).collect())),
        created_at: Set(now.into()),
    };
    Ok(am.insert(db).await?)
}

/// The session with `id` if it is still live.
pub async fn find_live(db: &DatabaseConnection, id: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(found.filter(Model::is_live))
}

/// Mark a session revoked. Returns `false` if it was unknown or already revoked.
pub async fn revoke(db: &DatabaseConnection, id: &str) -> Result<bool, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::RevokedAt, Expr::value(Some(DateTimeWithTimeZone::from(Utc::now()))))
        .filter(Column::Id.eq(id))
        .filter(Column::RevokedAt.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Revoke every live session of a user, e.g. after the account is disabled.
pub async fn revoke_all_for_user(db: &DatabaseConnection, user_id: &str) -> Result<u64, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::RevokedAt, Expr::value(Some(DateTimeWithTimeZone::from(Utc::now()))))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::RevokedAt.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::user::{CreateUser, Role};

    async fn user(db: &DatabaseConnection) -> anyhow::Result<user::Model> {
        let input = CreateUser { email: "s@example.com".into(), name: "S".into(), password: "password1".into() };
        Ok(user::create(db, &input, Role::Member).await?)
    }

    #[tokio::test]
    async fn live_until_revoked() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let u = user(&db).await?;
        let s = create(&db, &u.id, Duration::hours(1), Some("test-agent".into())).await?;
        assert!(find_live(&db, &s.id).await?.is_some());

        assert!(revoke(&db, &s.id).await?);
        assert!(!revoke(&db, &s.id).await?);
        assert!(find_live(&db, &s.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn expired_sessions_are_not_live() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let u = user(&db).await?;
        let s = create(&db, &u.id, Duration::seconds(-5), None).await?;
        assert!(find_live(&db, &s.id).await?.is_none());
        assert!(find_live(&db, "unknown").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn revoke_all_only_touches_live_rows() -> anyhow::Result<()> {
        let db = connect_in_memory().await?;
        let u = user(&db).await?;
        let a = create(&db, &u.id, Duration::hours(1), None).await?;
        create(&db, &u.id, Duration::hours(1), None).await?;
        revoke(&db, &a.id).await?;
        assert_eq!(revoke_all_for_user(&db, &u.id).await?, 1);
        Ok(())
    }
}
