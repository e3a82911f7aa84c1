//! Properties of accumulated sampling sessions.

use std::collections::HashSet;

use proptest::prelude::*;
use shoal_core::{CollectionStore, Filter, ItemId, SortSpec};

use crate::support::{catalog_over, quiz_store, run_session};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // A full session never repeats an item, covers the eligible set, and
    // finishes in exactly ceil(M / k) calls.
    #[test]
    fn test_session_exhausts_without_duplicates(
        total in 0u32..120,
        batch in 1i64..15,
        seed in any::<u64>(),
    ) {
        let rt = runtime();
        let (session, eligible) = rt.block_on(async {
            let store = quiz_store(total, seed).await;
            let eligible: HashSet<ItemId> = store
                .sorted_range(
                    "quizzes",
                    &Filter::all(),
                    &"createdAt".parse::<SortSpec>().expect("sort"),
                    0,
                    u64::MAX,
                )
                .await
                .expect("range")
                .into_iter()
                .map(|item| item.id)
                .collect();
            let catalog = catalog_over(store);
            let session = run_session(&catalog, "quizzes", batch, None, 500).await;
            (session, eligible)
        });

        let unique: HashSet<ItemId> = session.seen.iter().cloned().collect();
        prop_assert_eq!(unique.len(), session.seen.len());
        prop_assert_eq!(&unique, &eligible);

        let expected_calls = (u64::from(total).div_ceil(batch as u64)).max(1) as usize;
        prop_assert_eq!(session.calls(), expected_calls);
        prop_assert_eq!(session.batches.last().map(|b| b.remaining_batches), Some(0));

        for (index, result) in session.batches.iter().enumerate() {
            prop_assert!(result.items.len() as i64 <= batch);
            let expected_remaining = expected_calls - index - 1;
            prop_assert_eq!(result.remaining_batches, expected_remaining as u64);
        }
    }

    // Category-restricted sessions only ever see that category.
    #[test]
    fn test_category_session_stays_in_category(
        total in 1u32..90,
        batch in 1i64..10,
        seed in any::<u64>(),
    ) {
        let rt = runtime();
        let session = rt.block_on(async {
            let catalog = catalog_over(quiz_store(total, seed).await);
            run_session(&catalog, "quizzes", batch, Some("hard"), 500).await
        });

        let hard = (0..total).filter(|n| n % 3 == 0).count();
        prop_assert_eq!(session.seen.len(), hard);
        for result in &session.batches {
            for item in &result.items {
                prop_assert_eq!(
                    item.field("difficulty").and_then(|v| v.as_text()),
                    Some("hard")
                );
            }
        }
    }
}

#[tokio::test]
async fn test_sessions_differ_between_runs() {
    let catalog = catalog_over(quiz_store(200, 77).await);

    let mut first_batches = HashSet::new();
    for _ in 0..10 {
        let session = run_session(&catalog, "quizzes", 5, None, 1).await;
        let mut ids = session.seen.clone();
        ids.sort();
        first_batches.insert(ids);
    }
    assert!(first_batches.len() > 1, "sampling must not be a fixed rotation");
}
