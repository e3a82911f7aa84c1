//! Catalog facade over the Range Lister and Exclusion Sampler.
//!
//! Both components are stateless: every call carries everything it needs
//! (paging parameters, or the client's exclusion set) and reads the store.

mod lister;
mod sampler;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use lister::RangeLister;
pub use sampler::ExclusionSampler;
use tracing::warn;

use crate::config::{QueryConfig, ShoalConfig};
use crate::domain::{ListPage, ResourceDescriptor, ResourceRegistry, ResourceType, SampleResult};
use crate::params::{ListParams, SampleParams};
use crate::store::{CollectionStore, StoreError};
use crate::{CatalogError, Result};

/// Entry point used by transports: resolves resource names, normalizes raw
/// parameters and dispatches to the lister or sampler.
#[derive(Debug, Clone)]
pub struct Catalog {
    registry: Arc<ResourceRegistry>,
    limits: QueryConfig,
    lister: RangeLister,
    sampler: ExclusionSampler,
}

impl Catalog {
    /// Creates a catalog serving every built-in resource type.
    pub fn new(store: Arc<dyn CollectionStore>, config: &ShoalConfig) -> Self {
        Self::with_registry(store, ResourceRegistry::standard(), config)
    }

    /// Creates a catalog serving only the resource types in `registry`.
    pub fn with_registry(
        store: Arc<dyn CollectionStore>,
        registry: ResourceRegistry,
        config: &ShoalConfig,
    ) -> Self {
        let timeout = config.storage.query_timeout;
        Self {
            registry: Arc::new(registry),
            limits: config.query.clone(),
            lister: RangeLister::new(Arc::clone(&store), timeout),
            sampler: ExclusionSampler::new(store, timeout),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn limits(&self) -> &QueryConfig {
        &self.limits
    }

    /// Looks up the descriptor for a resource name.
    ///
    /// # Errors
    /// - `CatalogError::UnknownResource` - name not registered
    pub fn resolve(&self, resource: &str) -> Result<&ResourceDescriptor> {
        self.registry.resolve(resource)
    }

    /// Lists one page of a resource.
    ///
    /// # Errors
    /// - `CatalogError::UnknownResource` - resource not registered
    /// - `CatalogError::InvalidArgument` - malformed parameters
    /// - `CatalogError::StorageUnavailable` - store failed or timed out
    pub async fn list(&self, resource: &str, params: ListParams) -> Result<ListPage> {
        let descriptor = self.resolve(resource)?;
        let query = params.into_query(&self.limits)?;
        self.lister.list(descriptor, &query).await
    }

    /// Draws one randomized batch of a resource.
    ///
    /// # Errors
    /// - `CatalogError::UnknownResource` - resource not registered
    /// - `CatalogError::InvalidArgument` - malformed parameters
    /// - `CatalogError::StorageUnavailable` - store failed or timed out
    pub async fn sample(&self, resource: &str, params: SampleParams) -> Result<SampleResult> {
        let descriptor = self.resolve(resource)?;
        let request = params.into_request(&self.limits)?;
        self.sampler.sample(descriptor, &request).await
    }

    pub fn lister(&self) -> &RangeLister {
        &self.lister
    }

    pub fn sampler(&self) -> &ExclusionSampler {
        &self.sampler
    }
}

/// Runs one store call under the query deadline, mapping failures to
/// `StorageUnavailable` with operation and resource context.
async fn bounded<T>(
    operation: &'static str,
    resource: ResourceType,
    deadline: Duration,
    call: impl Future<Output = std::result::Result<T, StoreError>>,
) -> Result<T> {
    let outcome = match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            elapsed_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }),
    };

    outcome.map_err(|source| {
        warn!(operation, %resource, error = %source, "Store call failed");
        CatalogError::StorageUnavailable {
            operation,
            resource,
            source,
        }
    })
}
