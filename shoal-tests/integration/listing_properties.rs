//! Properties of paginated listings.

use std::collections::HashSet;

use proptest::prelude::*;
use shoal_core::params::ListParams;
use shoal_core::{Catalog, ListPage};

use crate::support::{catalog_over, quiz_store};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

async fn page(catalog: &Catalog, page: u64, limit: u64, sort: &str) -> ListPage {
    let params = ListParams {
        page: Some(page.to_string()),
        limit: Some(limit.to_string()),
        sort: Some(sort.to_string()),
        ..Default::default()
    };
    catalog.list("quizzes", params).await.expect("list failed")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Page counts and page lengths follow from the total and the limit.
    #[test]
    fn test_pagination_totals(
        total in 0u32..80,
        limit in 1u64..25,
        page_number in 1u64..12,
    ) {
        let rt = runtime();
        let result = rt.block_on(async {
            let catalog = catalog_over(quiz_store(total, 1).await);
            page(&catalog, page_number, limit, "-createdAt").await
        });

        let total = u64::from(total);
        let meta = result.pagination_results;
        prop_assert_eq!(meta.total_count, total);
        prop_assert_eq!(meta.number_of_pages, total.div_ceil(limit).max(1));
        prop_assert_eq!(meta.current_page, page_number);

        let expected_len = total.saturating_sub((page_number - 1) * limit).min(limit);
        prop_assert_eq!(result.data.len() as u64, expected_len);
        prop_assert_eq!(meta.next.is_some(), page_number < meta.number_of_pages);
    }

    // Walking every page yields each item exactly once, in sort order, and
    // repeating a call returns the same page.
    #[test]
    fn test_pages_partition_the_collection(
        total in 1u32..60,
        limit in 1u64..9,
        descending in any::<bool>(),
    ) {
        let sort = if descending { "-createdAt" } else { "createdAt" };
        let rt = runtime();
        let (pages, repeated_first) = rt.block_on(async {
            let catalog = catalog_over(quiz_store(total, 2).await);
            let first = page(&catalog, 1, limit, sort).await;
            let mut pages = vec![first];
            for number in 2..=pages[0].pagination_results.number_of_pages {
                pages.push(page(&catalog, number, limit, sort).await);
            }
            let repeated = page(&catalog, 1, limit, sort).await;
            (pages, repeated)
        });

        prop_assert_eq!(&pages[0], &repeated_first);

        let walked: Vec<_> = pages.iter().flat_map(|p| p.data.iter()).collect();
        prop_assert_eq!(walked.len() as u32, total);
        let unique: HashSet<_> = walked.iter().map(|item| item.id.clone()).collect();
        prop_assert_eq!(unique.len() as u32, total);

        for pair in walked.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let key_a = a.field("createdAt");
            let key_b = b.field("createdAt");
            if key_a == key_b {
                prop_assert!(a.id < b.id, "ties must break by ascending id");
            } else if descending {
                prop_assert!(key_a > key_b);
            } else {
                prop_assert!(key_a < key_b);
            }
        }
    }
}
