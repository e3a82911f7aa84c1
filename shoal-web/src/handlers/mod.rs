//! HTTP request handlers

pub mod api;
pub mod errors;

pub use api::{ResourceIndex, health, list_resource, list_resource_types, sample_resource};
pub use errors::ApiError;
