//! JSON API handlers for listing and sampling catalog resources

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Serialize;
use serde_json::{Value, json};
use shoal_core::params::{ListParams, SampleParams};
use shoal_core::{ListPage, ResourceDescriptor, SampleResult};
use tracing::debug;

use super::errors::ApiError;
use crate::server::AppState;

/// Response body of `GET /api/resources`.
#[derive(Debug, Serialize)]
pub struct ResourceIndex {
    pub resources: Vec<ResourceDescriptor>,
}

/// `GET /api/{resource}` - one page of a resource.
pub async fn list_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListPage>, ApiError> {
    let Query(params) = params?;
    debug!(%resource, ?params, "List request");
    let page = state.catalog.list(&resource, params).await?;
    Ok(Json(page))
}

/// `POST /api/{resource}/sample` - one randomized batch of a resource.
pub async fn sample_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Result<Json<SampleParams>, JsonRejection>,
) -> Result<Json<SampleResult>, ApiError> {
    let Json(params) = body?;
    debug!(
        %resource,
        batch_size = ?params.batch_size,
        excluded = params.exclude_ids.len(),
        "Sample request"
    );
    let batch = state.catalog.sample(&resource, params).await?;
    Ok(Json(batch))
}

/// `GET /api/resources` - descriptors of every served resource type.
pub async fn list_resource_types(State(state): State<AppState>) -> Json<ResourceIndex> {
    Json(ResourceIndex {
        resources: state.catalog.registry().iter().cloned().collect(),
    })
}

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
