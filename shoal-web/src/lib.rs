//! Shoal Web - JSON API Server
//!
//! Exposes the catalog's List and Sample operations over HTTP for frontend
//! applications. Handlers are thin: they extract raw parameters and hand
//! them to [`shoal_core::Catalog`], which owns all validation.

pub mod bootstrap;
pub mod handlers;
pub mod server;

// Re-export main types
pub use bootstrap::{BootstrapError, build_catalog};
pub use handlers::ApiError;
pub use server::{AppState, ServerError, build_router, run_server};
