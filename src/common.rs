//! Common types and utilities shared across handlers
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Page size used by the paged product listing
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Converts a one-based page number into the inclusive zero-based index
/// range `(start, end)` covering that page.
///
/// Page numbers below 1 are treated as page 1 and a zero page size as 1, so
/// the returned range is never empty and `end - start + 1 == page_size`.
pub fn pagination(page: u64, page_size: u64) -> (u64, u64) {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size - 1);
    (start, end)
}

/// Parses a page number leniently: anything that is not a positive integer
/// means page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// `?page=` query parameter for paged listings
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// One-based page number; invalid values fall back to 1
    #[param(value_type = Option<u64>, example = 1)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        parse_page(self.page.as_deref())
    }
}
