use serde::{Deserialize, Serialize};

/// Pagination metadata Taiga reports through `x-pagination-*` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub count: Option<i64>,
    pub current: Option<i64>,
    pub page_size: Option<i64>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl Pagination {
    /// True when Taiga sent none of the pagination headers.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Clamp a requested page size to `[1, ceiling]`, falling back to `default`.
pub fn effective_page_size(requested: Option<i64>, default: i64, ceiling: i64) -> i64 {
    match requested {
        Some(size) if size > 0 => size.min(ceiling),
        _ => default,
    }
}
