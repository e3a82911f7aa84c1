//! Exclusion Sampler: randomized batches without replacement across calls.
//!
//! The caller carries the session. Each call gets the ids already seen,
//! returns fresh ones, and the caller adds them to its exclusion set for the
//! next call. Nothing is remembered server-side.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::bounded;
use crate::Result;
use crate::domain::{ExclusionSet, Item, ResourceDescriptor, ResourceType, SampleRequest, SampleResult};
use crate::pagination::remaining_batches;
use crate::store::{CollectionStore, Filter};

/// Draws random batches of any resource type, never repeating an excluded id.
#[derive(Debug, Clone)]
pub struct ExclusionSampler {
    store: Arc<dyn CollectionStore>,
    query_timeout: Duration,
}

impl ExclusionSampler {
    pub fn new(store: Arc<dyn CollectionStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    /// Returns up to `batch_size` eligible items in random order plus the
    /// number of batches still needed to see the rest.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - zero batch size or category not
    ///   allowed for this resource
    /// - `CatalogError::StorageUnavailable` - store failed or timed out
    pub async fn sample(
        &self,
        descriptor: &ResourceDescriptor,
        request: &SampleRequest,
    ) -> Result<SampleResult> {
        request.validate()?;

        let mut filter = Filter::all().excluding(request.exclude.clone());
        if let Some(category) = &request.category {
            filter = filter.with_category(descriptor.category_match(category)?);
        }

        let collection = descriptor.collection;
        let eligible = bounded(
            "count",
            descriptor.resource,
            self.query_timeout,
            self.store.count(collection, &filter),
        )
        .await?;

        debug!(
            resource = %descriptor.resource,
            batch_size = request.batch_size,
            excluded = request.exclude.len(),
            eligible,
            "Sampling"
        );

        if eligible == 0 {
            return Ok(SampleResult::exhausted());
        }

        let wanted = usize::try_from(request.batch_size.min(eligible)).unwrap_or(usize::MAX);
        let drawn = bounded(
            "random_sample",
            descriptor.resource,
            self.query_timeout,
            self.store.random_sample(collection, &filter, wanted),
        )
        .await?;

        let items = screen_batch(drawn, &request.exclude, wanted, descriptor.resource);
        let remaining = remaining_batches(eligible, items.len() as u64, request.batch_size);

        Ok(SampleResult {
            items,
            remaining_batches: remaining,
        })
    }
}

/// Drops excluded or repeated items from a store answer and caps its size.
fn screen_batch(
    drawn: Vec<Item>,
    exclude: &ExclusionSet,
    cap: usize,
    resource: ResourceType,
) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(drawn.len());
    let mut batch = Vec::with_capacity(drawn.len().min(cap));

    for item in drawn {
        if exclude.contains(&item.id) {
            warn!(%resource, id = %item.id, "Store returned an excluded item; dropping it");
            continue;
        }
        if !seen.insert(item.id.clone()) {
            warn!(%resource, id = %item.id, "Store returned a duplicate item; dropping it");
            continue;
        }
        batch.push(item);
    }

    if batch.len() > cap {
        warn!(%resource, returned = batch.len(), cap, "Store returned an oversized batch");
        batch.truncate(cap);
    }
    batch
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::CatalogError;
    use crate::domain::{ItemId, SortSpec};
    use crate::store::{MemoryStore, StoreError};

    fn id(n: u8) -> ItemId {
        ItemId::from_bytes([n; 12])
    }

    fn quizzes() -> &'static ResourceDescriptor {
        ResourceType::Quiz.descriptor()
    }

    async fn sampler_with(count: u8) -> ExclusionSampler {
        let store = MemoryStore::with_seed(5);
        let items = (1..=count).map(|n| {
            Item::new(id(n))
                .with_field("question", format!("Q{n}"))
                .with_field("difficulty", if n <= 3 { "hard" } else { "easy" })
        });
        store.insert_many("quizzes", items).await;
        ExclusionSampler::new(Arc::new(store), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_five_items_batches_of_three() {
        let sampler = sampler_with(5).await;

        let first = sampler
            .sample(quizzes(), &SampleRequest::new(3))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.remaining_batches, 1);

        let seen: ExclusionSet = first.items.iter().map(|i| i.id.clone()).collect();
        let second = sampler
            .sample(quizzes(), &SampleRequest::new(3).excluding(seen.clone()))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.remaining_batches, 0);
        assert!(second.items.iter().all(|i| !seen.contains(&i.id)));
    }

    #[tokio::test]
    async fn test_everything_excluded_is_exhausted() {
        let sampler = sampler_with(4).await;
        let all: ExclusionSet = (1..=4).map(id).collect();

        let result = sampler
            .sample(quizzes(), &SampleRequest::new(2).excluding(all))
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert!(result.is_exhausted());
    }

    #[tokio::test]
    async fn test_category_restricts_eligible_set() {
        let sampler = sampler_with(10).await;
        let request = SampleRequest::new(10).with_category("hard");

        let result = sampler.sample(quizzes(), &request).await.unwrap();
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.remaining_batches, 0);

        let err = sampler
            .sample(quizzes(), &SampleRequest::new(2).with_category("impossible"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_zero_batch_rejected() {
        let sampler = sampler_with(2).await;
        let err = sampler
            .sample(quizzes(), &SampleRequest::new(0))
            .await
            .unwrap_err();
        assert!(err.is_user_error());
    }

    /// Store that ignores exclusions and repeats itself.
    #[derive(Debug)]
    struct SloppyStore {
        items: Vec<Item>,
    }

    #[async_trait]
    impl CollectionStore for SloppyStore {
        async fn count(&self, _collection: &str, filter: &Filter) -> std::result::Result<u64, StoreError> {
            Ok(self.items.iter().filter(|i| filter.matches(i)).count() as u64)
        }

        async fn random_sample(
            &self,
            _collection: &str,
            _filter: &Filter,
            n: usize,
        ) -> std::result::Result<Vec<Item>, StoreError> {
            let mut doubled = self.items.clone();
            doubled.extend(self.items.clone());
            doubled.truncate(n * 2);
            Ok(doubled)
        }

        async fn sorted_range(
            &self,
            _collection: &str,
            _filter: &Filter,
            _sort: &SortSpec,
            _skip: u64,
            _limit: u64,
        ) -> std::result::Result<Vec<Item>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_faulty_store_answers_are_screened() {
        let items: Vec<Item> = (1..=6).map(|n| Item::new(id(n))).collect();
        let sampler = ExclusionSampler::new(
            Arc::new(SloppyStore { items }),
            Duration::from_secs(1),
        );
        let exclude: ExclusionSet = [id(1), id(2)].into_iter().collect();

        let result = sampler
            .sample(quizzes(), &SampleRequest::new(3).excluding(exclude.clone()))
            .await
            .unwrap();
        assert_eq!(result.items.len(), 3);
        let ids: HashSet<_> = result.items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|i| !exclude.contains(i)));
    }

    #[test]
    fn test_screen_batch_caps_size() {
        let drawn: Vec<Item> = (1..=5).map(|n| Item::new(id(n))).collect();
        let batch = screen_batch(drawn, &ExclusionSet::new(), 2, ResourceType::Quiz);
        assert_eq!(batch.len(), 2);
    }
}
