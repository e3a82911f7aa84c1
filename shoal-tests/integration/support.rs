//! Shared helpers for integration tests.

use std::sync::Arc;

use shoal_core::params::SampleParams;
use shoal_core::{Catalog, CollectionStore, Item, ItemId, MemoryStore, SampleResult, ShoalConfig};

/// Deterministic identifier for test item `n`.
pub fn id(n: u32) -> ItemId {
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&0x65a1_f0c2u32.to_be_bytes());
    bytes[8..].copy_from_slice(&n.to_be_bytes());
    ItemId::from_bytes(bytes)
}

/// Store with `count` quizzes; every third one is "hard", the rest "easy".
pub async fn quiz_store(count: u32, seed: u64) -> MemoryStore {
    let store = MemoryStore::with_seed(seed);
    let items = (0..count).map(|n| {
        Item::new(id(n))
            .with_field("question", format!("Question number {n}"))
            .with_field("difficulty", if n % 3 == 0 { "hard" } else { "easy" })
            .with_field("createdAt", i64::from(n % 7))
    });
    store.insert_many("quizzes", items).await;
    store
}

pub fn catalog_over(store: impl CollectionStore + 'static) -> Catalog {
    Catalog::new(Arc::new(store), &ShoalConfig::for_testing())
}

/// Outcome of sampling a resource until it reports exhaustion.
#[derive(Debug, Default)]
pub struct SamplingSession {
    pub batches: Vec<SampleResult>,
    pub seen: Vec<ItemId>,
}

impl SamplingSession {
    pub fn calls(&self) -> usize {
        self.batches.len()
    }
}

/// Samples repeatedly, feeding every returned id back as an exclusion,
/// until `remainingBatches` reaches zero or `max_calls` is hit.
pub async fn run_session(
    catalog: &Catalog,
    resource: &str,
    batch_size: i64,
    category: Option<&str>,
    max_calls: usize,
) -> SamplingSession {
    let mut session = SamplingSession::default();
    while session.calls() < max_calls {
        let params = SampleParams {
            category: category.map(String::from),
            batch_size: Some(batch_size),
            exclude_ids: session.seen.iter().map(ToString::to_string).collect(),
        };
        let batch = catalog
            .sample(resource, params)
            .await
            .expect("sampling failed");
        session.seen.extend(batch.items.iter().map(|item| item.id.clone()));
        let done = batch.remaining_batches == 0;
        session.batches.push(batch);
        if done {
            break;
        }
    }
    session
}
