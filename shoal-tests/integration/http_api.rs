//! HTTP surface tests driven through the router with `oneshot`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use shoal_core::{Catalog, MemoryStore, ShoalConfig};
use shoal_sim::{CatalogFixture, FlakyStore};
use shoal_web::build_router;
use tower::ServiceExt;

async fn fixture_router(items_per_resource: usize) -> Router {
    let store = MemoryStore::with_seed(10);
    CatalogFixture::new(10, items_per_resource)
        .populate(&store)
        .await;
    build_router(Catalog::new(Arc::new(store), &ShoalConfig::for_testing()))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_sampling_session_over_http() {
    let router = fixture_router(23).await;
    let mut seen: Vec<String> = Vec::new();
    let mut calls = 0;

    loop {
        let body = json!({ "batchSize": 5, "excludeIds": seen });
        let (status, json) = send(&router, post_json("/api/videos/sample", &body)).await;
        assert_eq!(status, StatusCode::OK);
        calls += 1;

        for item in json["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
        if json["remainingBatches"] == 0 {
            break;
        }
        assert!(calls < 10, "session did not converge");
    }

    assert_eq!(calls, 5);
    assert_eq!(seen.len(), 23);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 23);
}

#[tokio::test]
async fn test_category_sampling_over_http() {
    let router = fixture_router(40).await;
    let body = json!({ "category": "trailer", "batchSize": 50, "excludeIds": [] });
    let (status, json) = send(&router, post_json("/api/videos/sample", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["remainingBatches"], 0);
    let items = json["items"].as_array().unwrap();
    assert!(items.iter().all(|item| item["type"] == "trailer"));
}

#[tokio::test]
async fn test_listing_search_and_exact_id() {
    let router = fixture_router(30).await;

    let (status, first) = send(&router, get("/api/playlists?limit=1&sort=title")).await;
    assert_eq!(status, StatusCode::OK);
    let item = &first["data"][0];
    let id = item["id"].as_str().unwrap();

    let uri = format!("/api/playlists?id={id}&keyword=zzzz-nothing");
    let (status, by_id) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["data"].as_array().unwrap().len(), 1);
    assert_eq!(by_id["data"][0]["id"], id);

    let (status, none) = send(&router, get("/api/playlists?keyword=zzzz-nothing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none["data"], json!([]));
    assert_eq!(none["paginationResults"]["numberOfPages"], 1);
    assert!(none["paginationResults"].get("next").is_none());
}

#[tokio::test]
async fn test_bad_requests() {
    let router = fixture_router(5).await;

    for uri in [
        "/api/quizzes?limit=-3",
        "/api/quizzes?page=1.5",
        "/api/quizzes?sort=answer",
        "/api/quizzes?category=impossible",
        "/api/episodes?category=movie",
        "/api/quizzes?id=not-an-id",
    ] {
        let (status, json) = send(&router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(json["error"].is_string(), "{uri}");
    }

    let body = json!({ "batchSize": 0 });
    let (status, _) = send(&router, post_json("/api/quizzes/sample", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "excludeIds": ["ZZZ"] });
    let (status, _) = send(&router, post_json("/api/quizzes/sample", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, get("/api/podcasts")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resource_index() {
    let router = fixture_router(1).await;
    let (status, json) = send(&router, get("/api/resources")).await;

    assert_eq!(status, StatusCode::OK);
    let resources = json["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 5);
    let playlist = resources
        .iter()
        .find(|r| r["resource"] == "playlist")
        .unwrap();
    assert_eq!(playlist["collection"], "playlists");
    assert_eq!(playlist["category"]["values"], json!(["movie", "series"]));
}

#[tokio::test]
async fn test_storage_failure_is_service_unavailable() {
    let flaky = FlakyStore::always_failing(Arc::new(MemoryStore::new()));
    let router = build_router(Catalog::new(Arc::new(flaky), &ShoalConfig::for_testing()));

    let (status, json) = send(&router, get("/api/flashcards")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("unavailable"));

    let (status, _) = send(&router, post_json("/api/flashcards/sample", &json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let router = fixture_router(1).await;
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
