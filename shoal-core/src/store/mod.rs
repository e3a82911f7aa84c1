//! Collection query interface.
//!
//! The lister and sampler only ever read through this narrow contract:
//! count, random sample and sorted range over a named collection. Creating,
//! updating and deleting items belongs to whoever owns the data store.

pub mod filter;
pub mod memory;

use async_trait::async_trait;
pub use filter::{CategoryMatch, Filter, KeywordMatch};
pub use memory::MemoryStore;
use thiserror::Error;

use crate::domain::{Item, SortSpec};

/// Failures reported by a collection store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend could not be reached or rejected the query.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description
        reason: String,
    },

    /// Query did not complete within the configured deadline.
    #[error("store query timed out after {elapsed_ms} ms")]
    Timeout {
        /// Deadline that expired, in milliseconds
        elapsed_ms: u64,
    },
}

/// Read-only query operations over named collections.
///
/// Implementations must tolerate concurrent calls. Unknown collections
/// behave as empty. Exclusions travel inside [`Filter::exclude`], so `count`
/// reports the eligible set and `random_sample` never returns an excluded
/// item.
#[async_trait]
pub trait CollectionStore: Send + Sync + std::fmt::Debug {
    /// Counts items matching the filter.
    ///
    /// # Errors
    /// - `StoreError::Unavailable` - Backend failure
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Returns up to `n` distinct, randomly chosen items matching the filter.
    ///
    /// Successive calls with the same arguments are expected to differ.
    ///
    /// # Errors
    /// - `StoreError::Unavailable` - Backend failure
    async fn random_sample(
        &self,
        collection: &str,
        filter: &Filter,
        n: usize,
    ) -> Result<Vec<Item>, StoreError>;

    /// Returns matching items ordered by `sort`, skipping `skip` and taking
    /// at most `limit`.
    ///
    /// # Errors
    /// - `StoreError::Unavailable` - Backend failure
    async fn sorted_range(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Item>, StoreError>;
}
