//! In-memory collection store
//!
//! Every collection keeps its items in a hash map plus an ordered index over
//! `(shuffle_key, id)`. Random sampling fills each slot by drawing a pivot
//! key and taking the first index entry at or after it, rejecting entries
//! that are ineligible or already picked. Exclusions are only ever probed, so
//! the cost of a draw does not grow with the size of the exclusion set.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::trace;

use super::{CollectionStore, Filter, StoreError};
use crate::domain::{Item, ItemId, SortSpec};

/// Pivot draws allowed per requested item before falling back to a walk.
const DRAWS_PER_SLOT: usize = 32;

#[derive(Debug, Default)]
struct Collection {
    items: HashMap<ItemId, Item>,
    shuffle_index: BTreeSet<(u64, ItemId)>,
}

impl Collection {
    fn insert(&mut self, item: Item) {
        if let Some(previous) = self.items.get(&item.id) {
            self.shuffle_index
                .remove(&(previous.shuffle_key, previous.id.clone()));
        }
        self.shuffle_index.insert((item.shuffle_key, item.id.clone()));
        self.items.insert(item.id.clone(), item);
    }

    fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let item = self.items.remove(id)?;
        self.shuffle_index.remove(&(item.shuffle_key, item.id.clone()));
        Some(item)
    }

    /// First index entry at or after `pivot`, wrapping to the smallest key.
    fn entry_at(&self, pivot: u64) -> Option<&ItemId> {
        self.shuffle_index
            .range((pivot, ItemId::floor())..)
            .next()
            .or_else(|| self.shuffle_index.first())
            .map(|(_, id)| id)
    }

    /// Picks up to `n` distinct matching items.
    ///
    /// Each slot is filled by rejection: a fresh pivot per draw, accepted
    /// only when the entry matches and was not picked yet. With random keys
    /// every eligible item is equally likely. When the eligible set is too
    /// sparse for the draw budget, the remaining slots are filled by walking
    /// the index from one more pivot.
    fn sample(&self, filter: &Filter, n: usize, rng: &mut StdRng) -> Vec<Item> {
        let mut picked: Vec<Item> = Vec::with_capacity(n.min(self.items.len()));
        let mut picked_ids: HashSet<&ItemId> = HashSet::with_capacity(picked.capacity());

        let budget = n.saturating_mul(DRAWS_PER_SLOT);
        let mut draws = 0;
        while picked.len() < n && draws < budget {
            draws += 1;
            let Some(id) = self.entry_at(rng.random()) else {
                return picked;
            };
            if picked_ids.contains(id) {
                continue;
            }
            if let Some(item) = self.items.get(id).filter(|item| filter.matches(item)) {
                picked_ids.insert(id);
                picked.push(item.clone());
            }
        }

        if picked.len() < n {
            trace!(picked = picked.len(), wanted = n, draws, "Draw budget spent, walking index");
            let start = (rng.random::<u64>(), ItemId::floor());
            let wrapped = self
                .shuffle_index
                .range(start.clone()..)
                .chain(self.shuffle_index.range(..start));
            for (_, id) in wrapped {
                if picked.len() == n {
                    break;
                }
                if picked_ids.contains(id) {
                    continue;
                }
                if let Some(item) = self.items.get(id).filter(|item| filter.matches(item)) {
                    picked_ids.insert(id);
                    picked.push(item.clone());
                }
            }
        }
        picked
    }

    fn matching<'a>(&'a self, filter: &'a Filter) -> Box<dyn Iterator<Item = &'a Item> + 'a> {
        match &filter.id {
            Some(id) => Box::new(
                self.items
                    .get(id)
                    .into_iter()
                    .filter(move |i| filter.matches(i)),
            ),
            None => Box::new(self.items.values().filter(move |i| filter.matches(i))),
        }
    }
}

/// Thread-safe in-memory implementation of [`CollectionStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    rng: Arc<Mutex<StdRng>>,
}

impl MemoryStore {
    /// Creates an empty store with an OS-seeded pivot generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates an empty store whose sampling pivots are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Inserts or replaces an item, keeping its shuffle key.
    pub async fn insert(&self, collection: &str, item: Item) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(item);
    }

    /// Inserts a batch of items under a single write lock.
    pub async fn insert_many(&self, collection: &str, items: impl IntoIterator<Item = Item>) {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        for item in items {
            target.insert(item);
        }
    }

    /// Removes an item, returning it if it existed.
    pub async fn remove(&self, collection: &str, id: &ItemId) -> Option<Item> {
        let mut collections = self.collections.write().await;
        collections.get_mut(collection)?.remove(id)
    }

    /// Number of items stored in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, |c| c.items.len())
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map_or(0, |c| c.matching(filter).count() as u64))
    }

    async fn random_sample(
        &self,
        collection: &str,
        filter: &Filter,
        n: usize,
    ) -> Result<Vec<Item>, StoreError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let collections = self.collections.read().await;
        let Some(target) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(target.sample(filter, n, &mut self.rng.lock()))
    }

    async fn sorted_range(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Item>, StoreError> {
        let collections = self.collections.read().await;
        let Some(target) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<&Item> = target.matching(filter).collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::{ExclusionSet, SortDirection};
    use crate::store::CategoryMatch;

    fn id(n: u8) -> ItemId {
        ItemId::from_bytes([n; 12])
    }

    async fn populated(count: u8) -> MemoryStore {
        let store = MemoryStore::with_seed(7);
        let items = (1..=count).map(|n| {
            Item::new(id(n))
                .with_field("rank", i64::from(n % 3))
                .with_field("type", if n % 2 == 0 { "movie" } else { "series" })
        });
        store.insert_many("playlists", items).await;
        store
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let sort = SortSpec::new("rank", SortDirection::Asc);
        assert_eq!(store.count("nope", &Filter::all()).await.unwrap(), 0);
        assert!(
            store
                .random_sample("nope", &Filter::all(), 5)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            store
                .sorted_range("nope", &Filter::all(), &sort, 0, 5)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_count_honors_category_and_exclusions() {
        let store = populated(10).await;
        let movies = Filter::all().with_category(CategoryMatch::new("type", "movie"));
        assert_eq!(store.count("playlists", &movies).await.unwrap(), 5);

        let excluded: ExclusionSet = [id(2), id(4), id(5)].into_iter().collect();
        let movies = movies.excluding(excluded);
        assert_eq!(store.count("playlists", &movies).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_random_sample_is_distinct_and_eligible() {
        let store = populated(50).await;
        let excluded: ExclusionSet = (1..=20).map(id).collect();
        let filter = Filter::all().excluding(excluded.clone());

        for _ in 0..20 {
            let sample = store.random_sample("playlists", &filter, 10).await.unwrap();
            assert_eq!(sample.len(), 10);
            let ids: HashSet<_> = sample.iter().map(|i| i.id.clone()).collect();
            assert_eq!(ids.len(), 10);
            assert!(ids.iter().all(|i| !excluded.contains(i)));
        }
    }

    #[tokio::test]
    async fn test_random_sample_returns_all_when_short() {
        let store = populated(4).await;
        let sample = store.random_sample("playlists", &Filter::all(), 10).await.unwrap();
        assert_eq!(sample.len(), 4);
    }

    #[tokio::test]
    async fn test_random_sample_varies_between_calls() {
        let store = populated(40).await;
        let mut firsts = HashSet::new();
        for _ in 0..30 {
            let sample = store.random_sample("playlists", &Filter::all(), 1).await.unwrap();
            firsts.insert(sample[0].id.clone());
        }
        assert!(firsts.len() > 1);
    }

    #[tokio::test]
    async fn test_draws_stay_even_after_partial_session() {
        let store = MemoryStore::with_seed(21);
        let spacing = u64::MAX / 100;
        let items = (0..100u8).map(|n| Item::new(id(n)).with_shuffle_key(u64::from(n) * spacing));
        store.insert_many("videos", items).await;

        let mut seen = ExclusionSet::new();
        for _ in 0..5 {
            let filter = Filter::all().excluding(seen.clone());
            let batch = store.random_sample("videos", &filter, 10).await.unwrap();
            seen.extend(batch.into_iter().map(|item| item.id));
        }
        assert_eq!(seen.len(), 50);

        let filter = Filter::all().excluding(seen.clone());
        let mut hits: HashMap<ItemId, u32> = HashMap::new();
        for _ in 0..20_000 {
            let draw = store.random_sample("videos", &filter, 1).await.unwrap();
            *hits.entry(draw[0].id.clone()).or_default() += 1;
        }

        // 400 expected per item; runs of excluded neighbours must not
        // funnel their share into the next eligible entry.
        assert_eq!(hits.len(), 50);
        assert!(hits.keys().all(|id| !seen.contains(id)));
        let min = hits.values().copied().min().unwrap();
        let max = hits.values().copied().max().unwrap();
        assert!(min > 250 && max < 600, "uneven draws: min={min} max={max}");
    }

    #[tokio::test]
    async fn test_sorted_range_orders_and_slices() {
        let store = populated(9).await;
        let sort = SortSpec::new("rank", SortDirection::Desc);
        let all = store
            .sorted_range("playlists", &Filter::all(), &sort, 0, 100)
            .await
            .unwrap();
        assert_eq!(all.len(), 9);
        for pair in all.windows(2) {
            assert_ne!(sort.compare(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
        }

        let middle = store
            .sorted_range("playlists", &Filter::all(), &sort, 3, 3)
            .await
            .unwrap();
        assert_eq!(middle, all[3..6].to_vec());

        let beyond = store
            .sorted_range("playlists", &Filter::all(), &sort, 50, 3)
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_replace_keeps_index_consistent() {
        let store = MemoryStore::with_seed(1);
        store
            .insert("quizzes", Item::new(id(1)).with_shuffle_key(10))
            .await;
        store
            .insert("quizzes", Item::new(id(1)).with_shuffle_key(99))
            .await;
        assert_eq!(store.len("quizzes").await, 1);
        let sample = store.random_sample("quizzes", &Filter::all(), 5).await.unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].shuffle_key, 99);

        assert!(store.remove("quizzes", &id(1)).await.is_some());
        assert!(store.is_empty("quizzes").await);
        assert!(
            store
                .random_sample("quizzes", &Filter::all(), 5)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_id_filter_uses_direct_lookup() {
        let store = populated(6).await;
        let filter = Filter::all().with_id(id(3));
        assert_eq!(store.count("playlists", &filter).await.unwrap(), 1);
        let excluded = filter.excluding([id(3)].into_iter().collect());
        assert_eq!(store.count("playlists", &excluded).await.unwrap(), 0);
    }
}
