//! Integration tests for Shoal
//!
//! Exercise the catalog through its public surfaces: the `Catalog` facade,
//! the HTTP router, and stores that misbehave.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/catalog_files.rs"]
mod catalog_files;
#[path = "integration/http_api.rs"]
mod http_api;
#[path = "integration/listing_properties.rs"]
mod listing_properties;
#[path = "integration/sampling_properties.rs"]
mod sampling_properties;
#[path = "integration/scenarios.rs"]
mod scenarios;
#[path = "integration/storage_failures.rs"]
mod storage_failures;
