//! Canonical pagination envelope
//!
//! Every paged endpoint returns the same shape: `{ data, pagination }`.
//! Replaces the ad-hoc mix of `{data, pagination}` / `{data, resumen}`
//! envelopes the legacy clients had to probe for.

use serde::{Deserialize, Serialize};

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total matching records
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Records per page
    pub page_size: u32,
    /// Total pages
    pub total_pages: u32,
}

/// A page of results plus its pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = if page_size > 0 {
            ((total as f64) / (page_size as f64)).ceil() as u32
        } else {
            1
        };

        Self {
            data,
            pagination: Pagination {
                total,
                page,
                page_size,
                total_pages,
            },
        }
    }

    /// Single-page response for unpaged listings
    pub fn single_page(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            data,
            pagination: Pagination {
                total,
                page: 1,
                page_size: total as u32,
                total_pages: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PaginatedResponse::new(vec![1, 2, 3], 101, 2, 10);
        assert_eq!(resp.pagination.total, 101);
        assert_eq!(resp.pagination.page, 2);
        assert_eq!(resp.pagination.total_pages, 11);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let resp = PaginatedResponse::new(vec![1], 1, 1, 20);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"pageSize\":20"));
        assert!(json.contains("\"totalPages\":1"));
    }
}
