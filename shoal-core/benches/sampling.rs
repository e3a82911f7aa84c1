use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use shoal_core::{
    ExclusionSampler, ExclusionSet, Item, ItemId, MemoryStore, ResourceType, SampleRequest,
};

const CATALOG_SIZE: u32 = 50_000;

fn id_for(n: u32) -> ItemId {
    let mut bytes = [0u8; 12];
    bytes[8..].copy_from_slice(&n.to_be_bytes());
    ItemId::from_bytes(bytes)
}

fn populated_store(runtime: &tokio::runtime::Runtime) -> MemoryStore {
    let store = MemoryStore::with_seed(99);
    let items = (0..CATALOG_SIZE).map(|n| {
        Item::new(id_for(n))
            .with_field("title", format!("Video {n}"))
            .with_field("type", if n % 3 == 0 { "trailer" } else { "movie" })
    });
    runtime.block_on(store.insert_many("videos", items));
    store
}

fn bench_sample_with_growing_exclusions(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let sampler = ExclusionSampler::new(Arc::new(populated_store(&runtime)), Duration::from_secs(5));
    let descriptor = ResourceType::Video.descriptor();

    let mut group = c.benchmark_group("sample_batch_of_20");
    for excluded in [0u32, 1_000, 10_000, 40_000] {
        let exclude: ExclusionSet = (0..excluded).map(id_for).collect();
        let request = SampleRequest::new(20).excluding(exclude);

        group.bench_with_input(BenchmarkId::from_parameter(excluded), &request, |b, request| {
            b.iter(|| {
                let result = runtime
                    .block_on(sampler.sample(descriptor, request))
                    .expect("sample");
                black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sample_with_growing_exclusions);
criterion_main!(benches);
