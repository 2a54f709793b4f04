//! Page arithmetic for lesson search

use serde::{Deserialize, Serialize};

use crate::models::LessonSummary;

/// Pagination metadata returned with every search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Requested page (1-indexed)
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPage {
    pub lessons: Vec<LessonSummary>,
    pub pagination: PageInfo,
}

/// Resolved page request: sanitized page and limit plus the row offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    /// Page defaults to 1, limit to `default_limit`; limit is clamped to `1..=max_limit`
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    pub fn info(&self, total_count: i64) -> PageInfo {
        let total_pages = (total_count + self.limit - 1) / self.limit;
        PageInfo {
            current_page: self.page,
            total_pages,
            total_count,
            has_next_page: self.page < total_pages,
            has_prev_page: self.page > 1,
        }
    }
}
