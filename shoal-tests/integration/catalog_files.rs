//! Production catalogs loaded from JSON data files.

use std::io::Write;

use shoal_core::params::ListParams;
use shoal_core::seed::SeedError;
use shoal_core::{ResourceType, RuntimeMode, ShoalConfig, SortSpec};
use shoal_sim::CatalogFixture;
use shoal_web::{BootstrapError, build_catalog};
use tempfile::NamedTempFile;

use crate::support::run_session;

fn production_config(file: &NamedTempFile) -> ShoalConfig {
    let mut config = ShoalConfig::for_testing();
    config.storage.data_file = Some(file.path().to_path_buf());
    config
}

#[tokio::test]
async fn test_generated_file_loads_in_production() {
    let generated = CatalogFixture::new(8, 30).generate_all();
    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, &generated).unwrap();
    file.flush().unwrap();

    let catalog = build_catalog(&production_config(&file), RuntimeMode::Production)
        .await
        .unwrap();

    for resource in ResourceType::ALL {
        let page = catalog
            .list(resource.as_str(), ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.pagination_results.total_count, 30, "{resource}");
    }

    let sort: SortSpec = "-createdAt".parse().unwrap();
    let mut expected = generated[&ResourceType::Video].clone();
    expected.sort_by(|a, b| sort.compare(a, b));

    let params = ListParams {
        limit: Some("30".to_string()),
        sort: Some(sort.to_string()),
        ..Default::default()
    };
    let page = catalog.list("videos", params).await.unwrap();
    assert_eq!(page.data.len(), 30);
    for (loaded, original) in page.data.iter().zip(&expected) {
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.fields, original.fields);
    }
}

#[tokio::test]
async fn test_loaded_catalog_supports_full_sessions() {
    let generated = CatalogFixture::new(9, 17).generate_all();
    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, &generated).unwrap();
    file.flush().unwrap();

    let catalog = build_catalog(&production_config(&file), RuntimeMode::Production)
        .await
        .unwrap();
    let session = run_session(&catalog, "flashcards", 4, None, 20).await;

    assert_eq!(session.calls(), 5);
    let mut seen = session.seen.clone();
    seen.sort();
    let mut all: Vec<_> = generated[&ResourceType::Flashcard]
        .iter()
        .map(|item| item.id.clone())
        .collect();
    all.sort();
    assert_eq!(seen, all);
}

#[tokio::test]
async fn test_malformed_file_stops_bootstrap() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"videos": {"title": "not a list"}}"#).unwrap();
    file.flush().unwrap();

    let err = build_catalog(&production_config(&file), RuntimeMode::Production)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Seed {
            source: SeedError::NotAnArray { .. },
            ..
        }
    ));
}
