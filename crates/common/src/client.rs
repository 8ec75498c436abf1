//! Typed HTTP client for the backoffice API.
//!
//! Every resource exposes the same five calls (`create`, `get_all`,
//! `get_by_id`, `update`, `delete_by_id`), each mapping to exactly one HTTP
//! request against a fixed path. The session cookie issued by `login` is kept
//! in the client's cookie store and sent on every later call.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::pagination::{next_page_param, Paginated};

pub const CUSTOMERS: &str = "/api/customers";
pub const BANK_ACCOUNTS: &str = "/api/bank-accounts";
pub const SERVICES: &str = "/api/services";
pub const INVOICES: &str = "/api/invoices";
pub const ADMIN_USERS: &str = "/admin/users";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("http {status}: {message}")]
    Status { status: u16, message: String, body: Option<serde_json::Value> },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool { self.status() == Some(StatusCode::NOT_FOUND.as_u16()) }

    pub fn is_unauthorized(&self) -> bool { self.status() == Some(StatusCode::UNAUTHORIZED.as_u16()) }
}

/// Shared HTTP client holding the base URL and the session cookie store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self::with_http(base_url, http))
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn resource(&self, path: &'static str) -> ResourceClient<'_> {
        ResourceClient { client: self, path }
    }

    pub fn customers(&self) -> ResourceClient<'_> { self.resource(CUSTOMERS) }
    pub fn bank_accounts(&self) -> ResourceClient<'_> { self.resource(BANK_ACCOUNTS) }
    pub fn services(&self) -> ResourceClient<'_> { self.resource(SERVICES) }
    pub fn invoices(&self) -> ResourceClient<'_> { self.resource(INVOICES) }
    pub fn users(&self) -> ResourceClient<'_> { self.resource(ADMIN_USERS) }

    /// Sign in; the session cookie is stored for later calls.
    pub async fn login<R: DeserializeOwned>(&self, email: &str, password: &str) -> Result<R, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        decode(resp).await
    }

    pub async fn register<P: Serialize, R: DeserializeOwned>(&self, payload: &P) -> Result<R, ClientError> {
        let resp = self.send(self.request(Method::POST, "/auth/register").json(payload)).await?;
        decode(resp).await
    }

    pub async fn me<R: DeserializeOwned>(&self) -> Result<R, ClientError> {
        let resp = self.send(self.request(Method::GET, "/auth/me")).await?;
        decode(resp).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send(self.request(Method::POST, "/auth/logout")).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = req.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "api response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.json::<serde_json::Value>().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message").or_else(|| b.get("error")))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        Err(ClientError::Status { status: status.as_u16(), message, body })
    }
}

/// Calls bound to one resource path, e.g. `/api/customers`.
#[derive(Clone, Copy, Debug)]
pub struct ResourceClient<'a> {
    client: &'a ApiClient,
    path: &'static str,
}

impl<'a> ResourceClient<'a> {
    pub fn path(&self) -> &'static str { self.path }

    /// `POST {path}`
    pub async fn create<P: Serialize, R: DeserializeOwned>(&self, payload: &P) -> Result<R, ClientError> {
        let resp = self.client.send(self.client.request(Method::POST, self.path).json(payload)).await?;
        decode(resp).await
    }

    /// `GET {path}?page=&limit=&search=`
    pub async fn get_all<R: DeserializeOwned>(
        &self,
        page: u64,
        limit: u64,
        search: Option<&str>,
    ) -> Result<Paginated<R>, ClientError> {
        let mut req = self
            .client
            .request(Method::GET, self.path)
            .query(&[("page", page), ("limit", limit)]);
        if let Some(s) = search.filter(|s| !s.is_empty()) {
            req = req.query(&[("search", s)]);
        }
        let resp = self.client.send(req).await?;
        decode(resp).await
    }

    /// `GET {path}/{id}`
    pub async fn get_by_id<R: DeserializeOwned>(&self, id: &str) -> Result<R, ClientError> {
        let resp = self.client.send(self.client.request(Method::GET, &self.item(id))).await?;
        decode(resp).await
    }

    /// `PUT {path}/{id}`
    pub async fn update<P: Serialize, R: DeserializeOwned>(&self, id: &str, payload: &P) -> Result<R, ClientError> {
        let resp = self.client.send(self.client.request(Method::PUT, &self.item(id)).json(payload)).await?;
        decode(resp).await
    }

    /// `DELETE {path}/{id}`
    pub async fn delete_by_id(&self, id: &str) -> Result<(), ClientError> {
        self.client.send(self.client.request(Method::DELETE, &self.item(id))).await?;
        Ok(())
    }

    /// Walk every page until the server says there is nothing left.
    pub async fn fetch_all<R: DeserializeOwned>(&self, limit: u64, search: Option<&str>) -> Result<Vec<R>, ClientError> {
        let mut pages: Vec<Paginated<R>> = Vec::new();
        let mut page = 1;
        loop {
            pages.push(self.get_all(page, limit, search).await?);
            let next = match pages.last() {
                Some(last) => next_page_param(last, &pages),
                None => None,
            };
            match next {
                Some(n) => page = n,
                None => break,
            }
        }
        Ok(pages.into_iter().flat_map(|p| p.data).collect())
    }

    fn item(&self, id: &str) -> String { format!("{}/{}", self.path, id) }
}

async fn decode<R: DeserializeOwned>(resp: Response) -> Result<R, ClientError> {
    resp.json::<R>().await.map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::{Path, Query}, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde::Deserialize;
    use serde_json::{json, Value};

    use crate::pagination::PageMeta;

    #[derive(Deserialize)]
    struct ListQuery { page: u64, limit: u64 }

    async fn list(Query(q): Query<ListQuery>) -> Json<Paginated<u64>> {
        let total = 12u64;
        let start = (q.page - 1) * q.limit;
        let data: Vec<u64> = (start..total.min(start + q.limit)).collect();
        Json(Paginated::new(data, PageMeta::new(q.page, q.limit, total)))
    }

    async fn item(Path(id): Path<String>) -> Result<Json<Value>, (AxumStatus, Json<Value>)> {
        if id == "missing" {
            return Err((AxumStatus::NOT_FOUND, Json(json!({"error": "Not Found", "message": "customer not found"}))));
        }
        Ok(Json(json!({ "id": id })))
    }

    async fn spawn() -> anyhow::Result<ApiClient> {
        let app = Router::new()
            .route("/api/customers", get(list))
            .route("/api/customers/:id", get(item));
        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(ApiClient::new(format!("http://{addr}/"))?)
    }

    #[tokio::test]
    async fn fetch_all_walks_every_page() -> anyhow::Result<()> {
        let client = spawn().await?;
        let all: Vec<u64> = client.customers().fetch_all(5, None).await?;
        assert_eq!(all, (0..12).collect::<Vec<_>>());
        Ok(())
    }

    #[tokio::test]
    async fn get_all_returns_descriptor() -> anyhow::Result<()> {
        let client = spawn().await?;
        let page: Paginated<u64> = client.customers().get_all(1, 5, Some("")).await?;
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta.next_page, Some(2));
        assert_eq!(page.meta.page_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn error_status_is_surfaced() -> anyhow::Result<()> {
        let client = spawn().await?;
        let found: Value = client.customers().get_by_id("abc").await?;
        assert_eq!(found["id"], "abc");

        let err = client.customers().get_by_id::<Value>("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("customer not found"));
        Ok(())
    }

    #[test]
    fn base_url_is_trimmed() {
        let c = ApiClient::with_http("http://localhost:8080/", reqwest::Client::new());
        assert_eq!(c.base_url(), "http://localhost:8080");
        assert_eq!(c.invoices().path(), INVOICES);
    }
}
