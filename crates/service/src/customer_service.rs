use common::pagination::Paginated;
use models::activity_log::{ActivityAction, ActivityLogInput};
use models::customer::{self, CreateCustomer, UpdateCustomer};
use models::Table;
use sea_orm::{Condition, DatabaseConnection};
use tracing::{info, instrument};

use crate::auth::domain::AuthContext;
use crate::crud::{self, ListParams};
use crate::errors::ServiceError;

/// Create a customer and log it.
#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn create_customer(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    input: CreateCustomer,
) -> Result<customer::Model, ServiceError> {
    let created = customer::create(db, input).await?;
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Create, Table::Customer, &created.id))
        .await?;
    info!(customer_id = %created.id, "customer_created");
    Ok(created)
}

/// Active customer by id.
pub async fn get_customer(db: &DatabaseConnection, id: &str) -> Result<customer::Model, ServiceError> {
    crud::get_active::<customer::Entity>(db, id).await
}

/// Page through active customers; `search` matches name, email or company.
pub async fn list_customers(
    db: &DatabaseConnection,
    params: &ListParams,
) -> Result<Paginated<customer::Model>, ServiceError> {
    let mut filter = Condition::all();
    if let Some(term) = params.search_term() {
        filter = filter.add(
            Condition::any()
                .add(crud::contains_ci(customer::Column::Name, term))
                .add(crud::contains_ci(customer::Column::Email, term))
                .add(crud::contains_ci(customer::Column::Company, term)),
        );
    }
    crud::list_active::<customer::Entity>(db, params.pagination(), filter).await
}

#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id))]
pub async fn update_customer(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    id: &str,
    input: UpdateCustomer,
) -> Result<customer::Model, ServiceError> {
    let existing = get_customer(db, id).await?;
    let updated = customer::update(db, existing, input).await?;
    crud::log_activity(db, ActivityLogInput::new(Some(&ctx.user_id), ActivityAction::Update, Table::Customer, id)).await?;
    info!(customer_id = %id, "customer_updated");
    Ok(updated)
}

/// Soft delete.
pub async fn delete_customer(db: &DatabaseConnection, ctx: &AuthContext, id: &str) -> Result<(), ServiceError> {
    crud::delete_record(db, Some(&ctx.user_id), Table::Customer, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_ctx, get_db};
    use models::parse_input;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::json;

    fn input(name: &str, company: Option<&str>) -> CreateCustomer {
        CreateCustomer {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            company: company.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn customer_lifecycle() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();

        let c = create_customer(&db, &ctx, input("Acme", None)).await?;
        assert_eq!(get_customer(&db, &c.id).await?.name, "Acme");

        let patch: UpdateCustomer = parse_input(json!({"company": "Acme Corp"}))?;
        let updated = update_customer(&db, &ctx, &c.id, patch).await?;
        assert_eq!(updated.company.as_deref(), Some("Acme Corp"));

        delete_customer(&db, &ctx, &c.id).await?;
        assert!(matches!(get_customer(&db, &c.id).await, Err(ServiceError::NotFound(_))));
        let patch: UpdateCustomer = parse_input(json!({"name": "Ghost"}))?;
        assert!(matches!(update_customer(&db, &ctx, &c.id, patch).await, Err(ServiceError::NotFound(_))));

        let actions: Vec<String> = models::activity_log::Entity::find()
            .all(&db)
            .await?
            .into_iter()
            .map(|l| l.action)
            .collect();
        assert_eq!(actions, vec!["create", "update", "delete"]);
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_name_email_or_company() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        create_customer(&db, &ctx, input("Globex", Some("Globex Corporation"))).await?;
        create_customer(&db, &ctx, input("Initech", None)).await?;
        create_customer(&db, &ctx, input("Hooli", Some("Hooli XYZ"))).await?;

        let params = ListParams { search: Some("glob".into()), ..Default::default() };
        let page = list_customers(&db, &params).await?;
        assert_eq!(page.meta.total_count, 1);
        assert_eq!(page.data[0].name, "Globex");

        let shouted = ListParams { search: Some("HOOLI".into()), ..Default::default() };
        assert_eq!(list_customers(&db, &shouted).await?.data[0].name, "Hooli");

        let all = list_customers(&db, &ListParams::default()).await?;
        assert_eq!(all.meta.total_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn search_wildcards_are_literal() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ctx = admin_ctx();
        create_customer(&db, &ctx, input("Acme", None)).await?;
        create_customer(&db, &ctx, input("Globex", Some("100% Globex"))).await?;

        for term in ["_", "\\", "%%"] {
            let params = ListParams { search: Some(term.into()), ..Default::default() };
            assert_eq!(list_customers(&db, &params).await?.meta.total_count, 0, "{term}");
        }
        let percent = ListParams { search: Some("%".into()), ..Default::default() };
        let page = list_customers(&db, &percent).await?;
        assert_eq!(page.meta.total_count, 1);
        assert_eq!(page.data[0].name, "Globex");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_not_logged() -> anyhow::Result<()> {
        let db = get_db().await?;
        let bad = CreateCustomer { name: "".into(), email: "x".into(), ..Default::default() };
        assert!(matches!(create_customer(&db, &admin_ctx(), bad).await, Err(ServiceError::Validation(_))));
        assert_eq!(models::activity_log::Entity::find().count(&db).await?, 0);
        Ok(())
    }
}
