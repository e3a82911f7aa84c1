//! End-to-end walkthroughs of the documented listing and sampling behavior.

use shoal_core::params::{ListParams, SampleParams};
use shoal_core::{Item, MemoryStore};

use crate::support::{catalog_over, id, quiz_store};

fn list_params(page: u64, limit: u64) -> ListParams {
    ListParams {
        page: Some(page.to_string()),
        limit: Some(limit.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_seven_items_paged_by_three() {
    let catalog = catalog_over(quiz_store(7, 1).await);

    let first = catalog.list("quizzes", list_params(1, 3)).await.unwrap();
    assert_eq!(first.data.len(), 3);
    assert_eq!(first.pagination_results.number_of_pages, 3);
    assert_eq!(first.pagination_results.next, Some(2));

    let last = catalog.list("quizzes", list_params(3, 3)).await.unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.pagination_results.next, None);
}

#[tokio::test]
async fn test_five_items_two_sample_calls() {
    let catalog = catalog_over(quiz_store(5, 2).await);

    let first = catalog
        .sample(
            "quizzes",
            SampleParams {
                batch_size: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.remaining_batches, 1);

    let seen: Vec<String> = first.items.iter().map(|i| i.id.to_string()).collect();
    let second = catalog
        .sample(
            "quizzes",
            SampleParams {
                batch_size: Some(3),
                exclude_ids: seen.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.remaining_batches, 0);
    assert!(second.items.iter().all(|i| !seen.contains(&i.id.to_string())));
}

#[tokio::test]
async fn test_unknown_exact_id_gives_empty_single_page() {
    let catalog = catalog_over(quiz_store(4, 3).await);

    let params = ListParams {
        id: Some(id(999).to_string()),
        ..Default::default()
    };
    let page = catalog.list("quizzes", params).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination_results.number_of_pages, 1);
}

#[tokio::test]
async fn test_keyword_matches_two_of_ten() {
    let store = MemoryStore::with_seed(4);
    let items = (0..10).map(|n| {
        let title = match n {
            2 => "The ABC of reefs".to_string(),
            6 => "Learning abc".to_string(),
            _ => format!("Ocean story {n}"),
        };
        Item::new(id(n))
            .with_field("title", title)
            .with_field("type", "movie")
    });
    store.insert_many("playlists", items).await;
    let catalog = catalog_over(store);

    let params = ListParams {
        keyword: Some("abc".to_string()),
        limit: Some("10".to_string()),
        ..Default::default()
    };
    let page = catalog.list("playlists", params).await.unwrap();
    let mut ids: Vec<_> = page.data.iter().map(|i| i.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec![id(2), id(6)]);
    assert_eq!(page.pagination_results.number_of_pages, 1);
}

#[tokio::test]
async fn test_excluding_everything_is_exhausted() {
    let catalog = catalog_over(quiz_store(6, 5).await);

    let params = SampleParams {
        batch_size: Some(4),
        exclude_ids: (0..6).map(|n| id(n).to_string()).collect(),
        ..Default::default()
    };
    let batch = catalog.sample("quizzes", params).await.unwrap();
    assert!(batch.items.is_empty());
    assert_eq!(batch.remaining_batches, 0);
}

#[tokio::test]
async fn test_exhausted_session_stays_empty() {
    let catalog = catalog_over(quiz_store(3, 6).await);
    let everything: Vec<String> = (0..3).map(|n| id(n).to_string()).collect();

    for _ in 0..3 {
        let batch = catalog
            .sample(
                "quiz",
                SampleParams {
                    exclude_ids: everything.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(batch.items.is_empty());
        assert_eq!(batch.remaining_batches, 0);
    }
}
