//! Shoal simulation support.
//!
//! Provides reproducible synthetic catalogs for development mode and tests,
//! plus a store decorator that injects latency and failures.
//!
//! # Example
//!
//! ```rust,no_run
//! use shoal_core::MemoryStore;
//! use shoal_sim::CatalogFixture;
//!
//! # async fn seed() {
//! let store = MemoryStore::with_seed(1);
//! let counts = CatalogFixture::new(42, 100).populate(&store).await;
//! assert_eq!(counts.values().sum::<usize>(), 500);
//! # }
//! ```

#![warn(missing_docs)]

pub mod content_database;
pub mod fixtures;
pub mod flaky_store;

pub use fixtures::CatalogFixture;
pub use flaky_store::FlakyStore;
