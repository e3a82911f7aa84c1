//! Builds the catalog served by the API according to the runtime mode.

use std::path::PathBuf;
use std::sync::Arc;

use shoal_core::seed::{SeedError, load_catalog_file};
use shoal_core::{Catalog, MemoryStore, RuntimeMode, ShoalConfig};
use shoal_sim::CatalogFixture;
use tracing::info;

/// Failures while preparing the catalog.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("production mode requires a data file (set SHOAL_DATA_FILE or pass --data)")]
    MissingDataFile,

    #[error("failed to load catalog from {path}: {source}")]
    Seed {
        path: PathBuf,
        #[source]
        source: SeedError,
    },
}

/// Creates and fills the in-memory store for `mode`.
///
/// Production loads the configured data file. Development generates a
/// synthetic catalog, then also loads the data file when one is configured.
///
/// # Errors
/// - `BootstrapError::MissingDataFile` - Production mode without a data file
/// - `BootstrapError::Seed` - Data file unreadable or malformed
pub async fn build_store(config: &ShoalConfig, mode: RuntimeMode) -> Result<MemoryStore, BootstrapError> {
    let store = match config.simulation.deterministic_seed {
        Some(seed) => MemoryStore::with_seed(seed),
        None => MemoryStore::new(),
    };

    if mode.is_development() {
        let items = config.simulation.items_per_resource;
        let mut fixture = match config.simulation.deterministic_seed {
            Some(seed) => CatalogFixture::new(seed, items),
            None => CatalogFixture::random(items),
        };
        let counts = fixture.populate(&store).await;
        info!(
            items = counts.values().sum::<usize>(),
            per_resource = items,
            "Seeded synthetic catalog"
        );
    }

    match (&config.storage.data_file, mode) {
        (Some(path), _) => {
            load_catalog_file(path, &store)
                .await
                .map_err(|source| BootstrapError::Seed {
                    path: path.clone(),
                    source,
                })?;
        }
        (None, RuntimeMode::Production) => return Err(BootstrapError::MissingDataFile),
        (None, RuntimeMode::Development) => {}
    }

    Ok(store)
}

/// Builds the catalog facade over a freshly prepared store.
///
/// # Errors
/// - Any error from [`build_store`]
pub async fn build_catalog(config: &ShoalConfig, mode: RuntimeMode) -> Result<Catalog, BootstrapError> {
    let store = build_store(config, mode).await?;
    Ok(Catalog::new(Arc::new(store), config))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use shoal_core::params::ListParams;

    use super::*;

    #[tokio::test]
    async fn test_production_requires_data_file() {
        let config = ShoalConfig::for_testing();
        let err = build_catalog(&config, RuntimeMode::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::MissingDataFile));
    }

    #[tokio::test]
    async fn test_production_loads_data_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"flashcards": [{"front": "Tide", "back": "Sea level change"}]}"#)
            .unwrap();

        let mut config = ShoalConfig::for_testing();
        config.storage.data_file = Some(file.path().to_path_buf());
        let catalog = build_catalog(&config, RuntimeMode::Production).await.unwrap();

        let page = catalog.list("flashcards", ListParams::default()).await.unwrap();
        assert_eq!(page.pagination_results.total_count, 1);
        let page = catalog.list("videos", ListParams::default()).await.unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_development_seeds_every_resource() {
        let config = ShoalConfig::for_testing();
        let catalog = build_catalog(&config, RuntimeMode::Development).await.unwrap();

        for descriptor in catalog.registry().iter() {
            let page = catalog
                .list(descriptor.collection, ListParams::default())
                .await
                .unwrap();
            assert_eq!(
                page.pagination_results.total_count,
                config.simulation.items_per_resource as u64
            );
        }
    }
}
