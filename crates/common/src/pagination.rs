//! Pagination contract shared by the server and the HTTP client.
//!
//! The server answers list requests with a [`Paginated`] envelope; the client
//! walks pages with [`next_page_param`] until the server-reported total is
//! reached.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page: page.unwrap_or(1), limit: limit.unwrap_or(DEFAULT_LIMIT) }
    }

    /// Clamp to sane defaults: page 0 becomes 1, limit is kept in `1..=MAX_LIMIT`.
    pub fn normalize(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = self.limit.clamp(1, MAX_LIMIT);
        Self { page, limit }
    }

    /// Zero-based page index as used by the ORM paginator.
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

/// Position of one page inside a paged result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub current_page: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
    pub page_count: u64,
    pub total_count: u64,
}

impl PageMeta {
    /// Build the descriptor for `page` of a `total`-row result split into `limit`-sized pages.
    ///
    /// A page past the end is clamped to the last page; an empty result set
    /// reports page 1 of 0 with no neighbours.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let Pagination { page, limit } = Pagination { page, limit }.normalize();
        let page_count = total.div_ceil(limit);
        let current_page = if page_count == 0 { 1 } else { page.min(page_count) };
        let is_first_page = current_page == 1;
        let is_last_page = current_page >= page_count;
        Self {
            is_first_page,
            is_last_page,
            current_page,
            previous_page: (!is_first_page).then(|| current_page - 1),
            next_page: (!is_last_page).then(|| current_page + 1),
            page_count,
            total_count: total,
        }
    }
}

/// List response envelope: `{ "data": [...], "meta": {...} }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self { Self { data, meta } }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated { data: self.data.into_iter().map(f).collect(), meta: self.meta }
    }
}

/// Decide which page to fetch after `last_page`, given every page fetched so far
/// (including `last_page`).
///
/// Returns `None` once the last page came back empty or the number of items
/// fetched so far reaches the server-reported total.
pub fn next_page_param<T>(last_page: &Paginated<T>, all_pages: &[Paginated<T>]) -> Option<u64> {
    if last_page.data.is_empty() {
        return None;
    }
    let fetched: usize = all_pages.iter().map(|p| p.data.len()).sum();
    if fetched as u64 >= last_page.meta.total_count {
        return None;
    }
    Some(all_pages.len() as u64 + 1)
}
