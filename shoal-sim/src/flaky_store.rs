//! Fault-injecting collection store.
//!
//! Wraps a real store and adds latency and random failures so timeout and
//! error paths can be exercised deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shoal_core::{CollectionStore, Filter, Item, SortSpec, StoreError};
use tracing::trace;

/// Store decorator that delays calls and fails a fraction of them.
#[derive(Debug)]
pub struct FlakyStore {
    inner: Arc<dyn CollectionStore>,
    rng: Mutex<ChaCha8Rng>,
    failure_rate: f64,
    response_delay: Duration,
    injected_failures: AtomicU64,
}

impl FlakyStore {
    /// Wraps a store without delay or failures.
    pub fn new(inner: Arc<dyn CollectionStore>) -> Self {
        Self {
            inner,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(42)),
            failure_rate: 0.0,
            response_delay: Duration::ZERO,
            injected_failures: AtomicU64::new(0),
        }
    }

    /// Wraps a store so that every call fails.
    pub fn always_failing(inner: Arc<dyn CollectionStore>) -> Self {
        Self::new(inner).with_failure_rate(1.0)
    }

    /// Sets the fraction of calls that fail, clamped to `0.0..=1.0`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the delay applied before every call.
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Reseeds the failure generator.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Number of failures injected so far.
    pub fn injected_failures(&self) -> u64 {
        self.injected_failures.load(Ordering::Relaxed)
    }

    async fn disturb(&self, operation: &'static str) -> Result<(), StoreError> {
        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }
        let fail = self.rng.lock().random_bool(self.failure_rate);
        if fail {
            self.injected_failures.fetch_add(1, Ordering::Relaxed);
            trace!(operation, "Injecting store failure");
            return Err(StoreError::Unavailable {
                reason: format!("simulated failure in {operation}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for FlakyStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.disturb("count").await?;
        self.inner.count(collection, filter).await
    }

    async fn random_sample(
        &self,
        collection: &str,
        filter: &Filter,
        n: usize,
    ) -> Result<Vec<Item>, StoreError> {
        self.disturb("random_sample").await?;
        self.inner.random_sample(collection, filter, n).await
    }

    async fn sorted_range(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Item>, StoreError> {
        self.disturb("sorted_range").await?;
        self.inner
            .sorted_range(collection, filter, sort, skip, limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use shoal_core::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_passthrough_without_failures() {
        let store = FlakyStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.count("videos", &Filter::all()).await, Ok(0));
        assert_eq!(store.injected_failures(), 0);
    }

    #[tokio::test]
    async fn test_always_failing() {
        let store = FlakyStore::always_failing(Arc::new(MemoryStore::new()));
        for _ in 0..5 {
            let err = store.count("videos", &Filter::all()).await.unwrap_err();
            assert!(matches!(err, StoreError::Unavailable { .. }));
        }
        assert_eq!(store.injected_failures(), 5);
    }

    #[tokio::test]
    async fn test_partial_failure_rate_is_seeded() {
        let run = |seed| async move {
            let store = FlakyStore::new(Arc::new(MemoryStore::new()))
                .with_failure_rate(0.5)
                .with_seed(seed);
            let mut outcomes = Vec::new();
            for _ in 0..32 {
                outcomes.push(store.count("quizzes", &Filter::all()).await.is_ok());
            }
            outcomes
        };

        let first = run(9).await;
        assert_eq!(first, run(9).await);
        assert!(first.iter().any(|ok| *ok));
        assert!(first.iter().any(|ok| !*ok));
    }
}
