//! Shoal Core - Catalog listing and randomized sampling
//!
//! This crate provides the read side of the Shoal content catalog: resource
//! descriptors, the collection query interface with an in-memory adapter,
//! offset pagination with sort and search, and duplicate-free random
//! sampling driven by a client-held exclusion set.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod mode;
pub mod pagination;
pub mod params;
pub mod seed;
pub mod store;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use catalog::{Catalog, ExclusionSampler, RangeLister};
pub use config::{QueryConfig, ShoalConfig};
pub use domain::{
    ExclusionSet, FieldValue, Item, ItemId, ListPage, ListQuery, ResourceDescriptor,
    ResourceRegistry, ResourceType, SampleRequest, SampleResult, SortDirection, SortSpec, Timestamp,
};
pub use mode::RuntimeMode;
pub use pagination::PaginationResult;
pub use store::{CollectionStore, Filter, MemoryStore, StoreError};

/// Errors surfaced by the List and Sample operations.
///
/// An empty result is never an error: a query matching nothing yields an
/// empty page or an exhausted batch.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Caller supplied a malformed or disallowed value.
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument {
        /// Name of the offending request field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Resource type name does not match any registered descriptor.
    #[error("Unknown resource type: {name}")]
    UnknownResource {
        /// The name that failed to resolve
        name: String,
    },

    /// The collection store failed or did not answer in time.
    #[error("Storage unavailable during {operation} on {resource}: {source}")]
    StorageUnavailable {
        /// Store operation that failed
        operation: &'static str,
        /// Resource type being queried
        resource: ResourceType,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    /// Builds an `InvalidArgument` error for the named field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::InvalidArgument { field, reason } => {
                format!("Invalid value for '{field}': {reason}")
            }
            CatalogError::UnknownResource { name } => format!("Unknown resource type '{name}'"),
            CatalogError::StorageUnavailable { .. } => {
                "Catalog storage is temporarily unavailable, please retry".to_string()
            }
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidArgument { .. } | CatalogError::UnknownResource { .. }
        )
    }

    /// Checks if the caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::StorageUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
