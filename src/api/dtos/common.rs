use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ValidationIssue;

/// Standard error response structure for API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error label (e.g., "Not found", "Validation error")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Stable machine-readable code (e.g., "NOT_FOUND", "PRODUCT_NOT_AVAILABLE")
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub details: Option<Vec<ValidationIssue>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size, clamped to the configured maximum
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub item_count: usize,
    pub total_items: i64,
}

impl PaginationMeta {
    pub fn new(current_page: u32, limit: u32, total_items: i64, item_count: usize) -> Self {
        let limit = i64::from(limit.max(1));
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items + limit - 1) / limit
        };
        Self {
            current_page,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            item_count,
            total_items,
        }
    }
}

/// Row offset of a 1-based page.
pub fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(limit)
}
