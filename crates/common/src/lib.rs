pub mod types;
pub mod utils;
pub mod pagination;
pub mod client;

pub use client::{ApiClient, ClientError, ResourceClient};
pub use pagination::{next_page_param, PageMeta, Paginated, Pagination};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
        assert!(!h.version.is_empty());
    }

    #[test]
    fn error_body_skips_empty_parts() {
        let body = types::ErrorBody { error: "Not Found".into(), message: None, fields: vec![] };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, serde_json::json!({ "error": "Not Found" }));
    }
}
