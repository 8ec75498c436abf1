//! Admin management of back-office users.

use common::pagination::Paginated;
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::user::{self, Role, UpdateUser, UserStatus};
use models::{session, Table};
use sea_orm::{Condition, DatabaseConnection};
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud::{self, ListParams};
use crate::errors::ServiceError;

/// Get an active user by id.
pub async fn get_user(db: &DatabaseConnection, id: &str) -> Result<user::Model, ServiceError> {
    crud::get_active::<user::Entity>(db, id).await
}

/// List active users; `search` matches email or name.
pub async fn list_users(db: &DatabaseConnection, params: &ListParams) -> Result<Paginated<user::Model>, ServiceError> {
    let mut filter = Condition::all();
    if let Some(term) = params.search_term() {
        filter = filter.add(
            Condition::any()
                .add(crud::contains_ci(user::Column::Email, term))
                .add(crud::contains_ci(user::Column::Name, term)),
        );
    }
    crud::list_active::<user::Entity>(db, params.pagination(), filter).await
}

/// Update role, status, name or email. Admins cannot demote or disable themselves.
#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id, target = %id))]
pub async fn update_user(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    id: &str,
    input: UpdateUser,
) -> Result<user::Model, ServiceError> {
    let existing = get_user(db, id).await?;
    if id == ctx.user_id {
        if input.role.is_some_and(|r| r != Role::Admin) {
            return Err(ServiceError::Forbidden("cannot remove your own admin role".into()));
        }
        if input.status == Some(UserStatus::Disabled) {
            return Err(ServiceError::Forbidden("cannot disable your own account".into()));
        }
    }
    if let Some(email) = &input.email {
        if let Some(other) = user::find_by_email(db, email).await? {
            if other.id != existing.id {
                return Err(ServiceError::Conflict("email already in use".into()));
            }
        }
    }
    let disabling = input.status == Some(UserStatus::Disabled);
    let updated = user::update(db, existing, input).await?;
    if disabling {
        let revoked = session::revoke_all_for_user(db, id).await?;
        info!(target_user = %id, revoked, "user_sessions_revoked");
    }
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Update, Table::User, id)).await?;
    info!(target_user = %id, role = %updated.role, status = %updated.status, "user_updated");
    Ok(updated)
}

/// Soft-delete a user and end their sessions.
#[instrument(skip(db, ctx), fields(user_id = %ctx.user_id, target = %id))]
pub async fn delete_user(db: &DatabaseConnection, ctx: &AuthContext, id: &str) -> Result<(), ServiceError> {
    if id == ctx.user_id {
        return Err(ServiceError::Forbidden("cannot delete your own account".into()));
    }
    crud::delete_record(db, Some(&ctx.user_id), Table::User, id).await?;
    session::revoke_all_for_user(db, id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, get_db};
    use chrono::Duration;
    use models::parse_input;
    use models::user::CreateUser;
    use serde_json::json;

    async fn member(db: &DatabaseConnection, email: &str) -> anyhow::Result<user::Model> {
        let input = CreateUser { email: email.into(), name: "Member".into(), password: "password1".into() };
        Ok(user::create(db, &input, Role::Member).await?)
    }

    #[tokio::test]
    async fn disabling_revokes_sessions() -> anyhow::Result<()> {
        let db = get_db().await?;
        let m = member(&db, "m@example.com").await?;
        let s = session::create(&db, &m.id, Duration::hours(1), None).await?;

        let patch: UpdateUser = parse_input(json!({"status": "disabled"}))?;
        let updated = update_user(&db, &admin_ctx(), &m.id, patch).await?;
        assert_eq!(updated.status, "disabled");
        assert!(session::find_live(&db, &s.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn email_must_stay_unique() -> anyhow::Result<()> {
        let db = get_db().await?;
        member(&db, "taken@example.com").await?;
        let m = member(&db, "m@example.com").await?;
        let patch: UpdateUser = parse_input(json!({"email": "TAKEN@example.com"}))?;
        assert!(matches!(update_user(&db, &admin_ctx(), &m.id, patch).await, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn admins_cannot_lock_themselves_out() -> anyhow::Result<()> {
        let db = get_db().await?;
        let me = member(&db, "me@example.com").await?;
        let ctx = AuthContext { user_id: me.id.clone(), ..admin_ctx() };

        let demote: UpdateUser = parse_input(json!({"role": "member"}))?;
        assert!(matches!(update_user(&db, &ctx, &me.id, demote).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(delete_user(&db, &ctx, &me.id).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }

    #[tokio::test]
    async fn deleted_users_leave_the_list() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = member(&db, "a@example.com").await?;
        member(&db, "b@example.com").await?;
        delete_user(&db, &admin_ctx(), &a.id).await?;

        let page = list_users(&db, &ListParams::default()).await?;
        assert_eq!(page.meta.total_count, 1);
        assert_eq!(page.data[0].email, "b@example.com");
        let search = ListParams { search: Some("a@".into()), ..Default::default() };
        assert_eq!(list_users(&db, &search).await?.meta.total_count, 0);
        Ok(())
    }
}
