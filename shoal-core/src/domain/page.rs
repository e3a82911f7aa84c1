//! Results returned by the List and Sample operations.

use serde::{Deserialize, Serialize};

use super::item::Item;
use crate::pagination::PaginationResult;

/// One page of a sorted listing plus metadata to drive further paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub data: Vec<Item>,
    pub pagination_results: PaginationResult,
}

/// One randomized batch plus an estimate of how many batches remain unseen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResult {
    pub items: Vec<Item>,
    pub remaining_batches: u64,
}

impl SampleResult {
    /// Empty batch returned once the eligible set is used up.
    pub fn exhausted() -> Self {
        Self {
            items: Vec::new(),
            remaining_batches: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_batches == 0
    }
}
