//! JSON API server for the Shoal catalog
//!
//! Routes:
//! - `GET  /api/health`
//! - `GET  /api/resources`
//! - `GET  /api/{resource}?page&limit&sort&keyword&id&category`
//! - `POST /api/{resource}/sample`

use axum::Router;
use axum::routing::{get, post};
use shoal_core::{Catalog, RuntimeMode, ShoalConfig};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::bootstrap::{BootstrapError, build_catalog};
use crate::handlers::{health, list_resource, list_resource_types, sample_resource};

/// Shared handler state. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

/// Failures that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the API router over a catalog.
pub fn build_router(catalog: Catalog) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/resources", get(list_resource_types))
        .route("/api/{resource}", get(list_resource))
        .route("/api/{resource}/sample", post(sample_resource))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { catalog })
}

/// Prepares the catalog for `mode` and serves the API until shutdown.
///
/// # Errors
/// - `ServerError::Bootstrap` - Catalog could not be prepared
/// - `ServerError::Io` - Listener could not bind or serve
pub async fn run_server(config: ShoalConfig, mode: RuntimeMode) -> Result<(), ServerError> {
    let catalog = build_catalog(&config, mode).await?;
    let app = build_router(catalog);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%mode, "Shoal catalog API running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shoal catalog API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use shoal_core::{Item, ItemId, MemoryStore};
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> Router {
        let store = MemoryStore::with_seed(2);
        let items = (1..=7u8).map(|n| {
            Item::new(ItemId::from_bytes([n; 12]))
                .with_field("title", format!("Episode {n}"))
                .with_field("episodeNumber", i64::from(n))
        });
        store.insert_many("episodes", items).await;
        build_router(Catalog::new(Arc::new(store), &ShoalConfig::for_testing()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .await
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_page_shape() {
        let response = test_router()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/episodes?page=1&limit=3&sort=episodeNumber")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"][0]["episodeNumber"], 1);
        assert_eq!(json["paginationResults"]["numberOfPages"], 3);
        assert_eq!(json["paginationResults"]["next"], 2);
        assert_eq!(json["paginationResults"]["totalCount"], 7);
    }

    #[tokio::test]
    async fn test_invalid_page_is_bad_request() {
        let response = test_router()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/episodes?page=zero")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("page"));
    }

    #[tokio::test]
    async fn test_unknown_resource_is_not_found() {
        let response = test_router()
            .await
            .oneshot(Request::builder().uri("/api/podcasts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sample_round() {
        let response = test_router()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/episodes/sample")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"batchSize": 5, "excludeIds": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["items"].as_array().unwrap().len(), 5);
        assert_eq!(json["remainingBatches"], 1);
    }

    #[tokio::test]
    async fn test_malformed_sample_body() {
        let response = test_router()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/episodes/sample")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"batchSize": "lots"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
