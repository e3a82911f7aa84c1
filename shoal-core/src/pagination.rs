//! Pagination and remaining-batch arithmetic.

use serde::{Deserialize, Serialize};

/// Paging metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub current_page: u64,
    pub number_of_pages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
    pub total_count: u64,
}

impl PaginationResult {
    /// Derives paging metadata for `page` given the filtered total.
    ///
    /// A listing with zero matches still reports a single page so clients
    /// never see "page 1 of 0".
    pub fn compute(page: u64, limit: u64, total_count: u64) -> Self {
        let number_of_pages = page_count(total_count, limit);
        Self {
            current_page: page,
            number_of_pages,
            next: (page < number_of_pages).then(|| page + 1),
            total_count,
        }
    }
}

/// Number of pages needed for `total` items, never less than one.
pub fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1)).max(1)
}

/// Items skipped before `page`; saturates instead of overflowing.
pub fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Batches still needed to deliver what remains after this batch.
pub fn remaining_batches(eligible: u64, delivered: u64, batch_size: u64) -> u64 {
    eligible.saturating_sub(delivered).div_ceil(batch_size.max(1))
}
