use std::net::SocketAddr;

use common::{ApiClient, Paginated};
use configs::{AppConfig, AuthConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    let cfg = AppConfig { auth: AuthConfig::for_tests(), ..AppConfig::default() };
    let app = server::build_app(db, &cfg);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

async fn signed_in_client(app: &TestApp, email: &str) -> anyhow::Result<ApiClient> {
    let client = ApiClient::new(app.base_url.clone())?;
    let _: Value = client.register(&json!({"email": email, "name": "E2E", "password": "S3curePass!"})).await?;
    let _: Value = client.login(email, "S3curePass!").await?;
    Ok(client)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_requires_session() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = ApiClient::new(app.base_url.clone())?;
    let err = client.customers().get_all::<Value>(1, 10, None).await.unwrap_err();
    assert!(err.is_unauthorized());
    Ok(())
}

#[tokio::test]
async fn e2e_customer_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = signed_in_client(&app, "e2e@example.com").await?;

    let me: Value = client.me().await?;
    assert_eq!(me["email"], "e2e@example.com");

    let customers = client.customers();
    for i in 0..12 {
        let _: Value = customers.create(&json!({"name": format!("Customer {i:02}"), "email": format!("c{i}@example.com")})).await?;
    }

    let first: Paginated<Value> = customers.get_all(1, 5, None).await?;
    assert_eq!(first.data.len(), 5);
    assert_eq!(first.meta.page_count, 3);
    assert_eq!(first.meta.next_page, Some(2));

    let all: Vec<Value> = customers.fetch_all(5, None).await?;
    assert_eq!(all.len(), 12);

    let id = all[0]["id"].as_str().unwrap_or_default().to_string();
    let updated: Value = customers.update(&id, &json!({"notes": "priority"})).await?;
    assert_eq!(updated["notes"], "priority");

    customers.delete_by_id(&id).await?;
    let err = customers.get_by_id::<Value>(&id).await.unwrap_err();
    assert!(err.is_not_found());

    let remaining: Vec<Value> = customers.fetch_all(5, None).await?;
    assert_eq!(remaining.len(), 11);

    client.logout().await?;
    assert!(client.me::<Value>().await.unwrap_err().is_unauthorized());
    Ok(())
}

#[tokio::test]
async fn e2e_bank_account_and_invoice() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = signed_in_client(&app, "billing@example.com").await?;

    let customer: Value = client.customers().create(&json!({"name": "Acme", "email": "acme@example.com"})).await?;
    let customer_id = customer["id"].as_str().unwrap_or_default();

    let account: Value = client
        .bank_accounts()
        .create(&json!({
            "bank_name": "First Bank",
            "account_name": "Acme Ltd",
            "account_number": "12345678",
            "currency": "EUR",
            "customer_id": customer_id,
            "is_default": true
        }))
        .await?;
    assert_eq!(account["is_default"], true);

    let invoice: Value = client
        .invoices()
        .create(&json!({
            "invoice_number": "INV-2024-001",
            "customer_id": customer_id,
            "bank_account_id": account["id"],
            "amount": 125000,
            "currency": "EUR",
            "issue_date": "2024-03-01T00:00:00Z",
            "due_date": "2024-03-31T00:00:00Z"
        }))
        .await?;
    assert_eq!(invoice["status"], "draft");

    let paid: Value = client.invoices().update(invoice["id"].as_str().unwrap_or_default(), &json!({"status": "paid"})).await?;
    assert_eq!(paid["status"], "paid");
    assert!(!paid["paid_at"].is_null());

    let dup = client
        .invoices()
        .create::<_, Value>(&json!({
            "invoice_number": "INV-2024-001",
            "customer_id": customer_id,
            "amount": 1,
            "currency": "EUR",
            "issue_date": "2024-03-01T00:00:00Z",
            "due_date": "2024-03-31T00:00:00Z"
        }))
        .await
        .unwrap_err();
    assert_eq!(dup.status(), Some(409));
    Ok(())
}
