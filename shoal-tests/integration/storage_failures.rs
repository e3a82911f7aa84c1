//! Storage failures and timeouts surface as `StorageUnavailable`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use shoal_core::params::{ListParams, SampleParams};
use shoal_core::{
    Catalog, CatalogError, CollectionStore, Filter, Item, MemoryStore, ResourceType, ShoalConfig,
    SortSpec, StoreError,
};
use shoal_sim::FlakyStore;

use crate::support::{catalog_over, quiz_store};

/// Store that never answers within any reasonable deadline.
#[derive(Debug)]
struct StalledStore;

#[async_trait]
impl CollectionStore for StalledStore {
    async fn count(&self, _collection: &str, _filter: &Filter) -> Result<u64, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    }

    async fn random_sample(
        &self,
        _collection: &str,
        _filter: &Filter,
        _n: usize,
    ) -> Result<Vec<Item>, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn sorted_range(
        &self,
        _collection: &str,
        _filter: &Filter,
        _sort: &SortSpec,
        _skip: u64,
        _limit: u64,
    ) -> Result<Vec<Item>, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_failing_store_on_list() {
    let flaky = FlakyStore::always_failing(Arc::new(MemoryStore::new()));
    let catalog = catalog_over(flaky);

    let err = catalog
        .list("videos", ListParams::default())
        .await
        .unwrap_err();
    match err {
        CatalogError::StorageUnavailable {
            resource, source, ..
        } => {
            assert_eq!(resource, ResourceType::Video);
            assert!(matches!(source, StoreError::Unavailable { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_failing_store_on_sample() {
    let flaky = FlakyStore::always_failing(Arc::new(quiz_store(10, 1).await));
    let catalog = catalog_over(flaky);

    let err = catalog
        .sample("quizzes", SampleParams::default())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        CatalogError::StorageUnavailable {
            operation: "count",
            resource: ResourceType::Quiz,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_times_out() {
    let mut config = ShoalConfig::for_testing();
    config.storage.query_timeout = Duration::from_millis(200);
    let catalog = Catalog::new(Arc::new(StalledStore), &config);

    let err = catalog
        .list("episodes", ListParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::StorageUnavailable {
            source: StoreError::Timeout { elapsed_ms: 200 },
            ..
        }
    ));

    let err = catalog
        .sample("episodes", SampleParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::StorageUnavailable {
            operation: "count",
            source: StoreError::Timeout { .. },
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_within_deadline_succeeds() {
    let slow = FlakyStore::new(Arc::new(quiz_store(8, 3).await))
        .with_response_delay(Duration::from_millis(100));
    let catalog = catalog_over(slow);

    let page = catalog
        .list("quizzes", ListParams::default())
        .await
        .unwrap();
    assert_eq!(page.pagination_results.total_count, 8);
}

#[tokio::test]
async fn test_partial_failures_never_corrupt_results() {
    let flaky = FlakyStore::new(Arc::new(quiz_store(30, 4).await))
        .with_failure_rate(0.3)
        .with_seed(17);
    let catalog = catalog_over(flaky);

    let calls = (0..40).map(|_| {
        catalog.sample(
            "quizzes",
            SampleParams {
                batch_size: Some(7),
                ..Default::default()
            },
        )
    });
    let outcomes = join_all(calls).await;

    let mut failures = 0;
    for outcome in outcomes {
        match outcome {
            Ok(batch) => {
                assert_eq!(batch.items.len(), 7);
                assert_eq!(batch.remaining_batches, 4);
            }
            Err(err) => {
                assert!(err.is_retryable());
                failures += 1;
            }
        }
    }
    assert!(failures > 0 && failures < 40);
}
