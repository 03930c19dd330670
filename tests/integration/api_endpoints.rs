//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - Liveness, readiness and metrics endpoints respond correctly
//! - Score submission validates `points` and fills in defaults
//! - Listing returns at most 50 scores, newest first
//! - Session endpoints move the active sessions gauge

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use snake_scores::storage::MemoryBackend;

use crate::helpers::spawn_test_api;

#[tokio::test]
async fn test_healthz_returns_ok() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server
        .client
        .get(server.url("/healthz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json, json!({ "ok": true }));
}

#[tokio::test]
async fn test_readyz_with_memory_backend() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server
        .client
        .get(server.url("/readyz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json, json!({ "ready": true }));
}

#[tokio::test]
async fn test_submit_and_list_score() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server
        .client
        .post(server.url("/api/scores"))
        .json(&json!({ "points": 42 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(created["user_id"], "anonymous");
    assert_eq!(created["points"], json!(42));
    assert!(created["created_at"].as_str().is_some_and(|ts| ts.ends_with('Z')));

    let response = server
        .client
        .get(server.url("/api/scores"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let scores: Vec<Value> = response.json().await.unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0], created);
}

#[tokio::test]
async fn test_submit_keeps_user_and_float_points() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server
        .client
        .post(server.url("/api/scores"))
        .json(&json!({ "user_id": "ada", "points": 3.25 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["user_id"], "ada");
    assert_eq!(created["points"], json!(3.25));
}

#[tokio::test]
async fn test_invalid_points_are_rejected_without_write() {
    let backend = Arc::new(MemoryBackend::new());
    let server = spawn_test_api(backend.clone()).await;

    for body in [
        json!({ "points": "42" }),
        json!({ "points": true }),
        json!({ "points": null }),
        json!({ "user_id": "ada" }),
    ] {
        let response = server
            .client
            .post(server.url("/api/scores"))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["error"], "points must be a number");
    }

    let response = server
        .client
        .post(server.url("/api/scores"))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(server.url("/api/scores"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(backend.is_empty().await);
    assert_eq!(server.metrics.scores_submitted(), 0);
}

#[tokio::test]
async fn test_duplicate_submissions_create_distinct_records() {
    let backend = Arc::new(MemoryBackend::new());
    let server = spawn_test_api(backend.clone()).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let created: Value = server
            .client
            .post(server.url("/api/scores"))
            .json(&json!({ "user_id": "bob", "points": 7 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    assert_ne!(ids[0], ids[1]);
    assert_eq!(backend.len().await, 2);
    assert_eq!(server.metrics.scores_submitted(), 2);
}

#[tokio::test]
async fn test_list_returns_at_most_fifty_newest_first() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    for points in 0..60 {
        let response = server
            .client
            .post(server.url("/api/scores"))
            .json(&json!({ "points": points }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let scores: Vec<Value> = server
        .client
        .get(server.url("/api/scores"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(scores.len(), 50);
    let points: Vec<i64> = scores.iter().map(|s| s["points"].as_i64().unwrap()).collect();
    let expected: Vec<i64> = (10..60).rev().collect();
    assert_eq!(points, expected);
    assert!(
        scores
            .windows(2)
            .all(|pair| pair[0]["created_at"].as_str() >= pair[1]["created_at"].as_str())
    );
}

#[tokio::test]
async fn test_session_endpoints_move_gauge() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    for path in ["/api/session/start", "/api/session/start", "/api/session/end"] {
        let response = server.client.post(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json, json!({ "ok": true }));
    }

    assert_eq!(server.metrics.active_sessions(), 1);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    server
        .client
        .get(server.url("/healthz"))
        .send()
        .await
        .unwrap();
    server
        .client
        .post(server.url("/api/scores"))
        .json(&json!({ "points": 1 }))
        .send()
        .await
        .unwrap();
    server
        .client
        .post(server.url("/api/session/start"))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = response.text().await.unwrap();
    assert!(text.contains(
        "snake_http_requests_total{method=\"GET\",route=\"/healthz\",status=\"200\"} 1"
    ));
    assert!(text.contains(
        "snake_http_requests_total{method=\"POST\",route=\"/api/scores\",status=\"201\"} 1"
    ));
    assert!(text.contains("snake_scores_submitted_total 1"));
    assert!(text.contains("snake_active_sessions 1"));
}

#[tokio::test]
async fn test_unmatched_paths_share_one_series() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    for i in 0..200 {
        let response = server
            .client
            .get(server.url(&format!("/missing-{i}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let text = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let series: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("snake_http_requests_total{"))
        .collect();
    assert!(series.len() < 5, "unexpected series: {series:?}");
    assert!(!text.contains("/missing-"));
    assert!(text.contains(
        "snake_http_requests_total{method=\"GET\",route=\"fallback\",status=\"404\"} 200"
    ));
}

#[tokio::test]
async fn test_landing_page_is_served() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server.client.get(server.url("/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let page = response.text().await.unwrap();
    assert!(page.contains("<canvas"));
    // Stored user ids must only ever reach the DOM as text
    assert!(page.contains("textContent"));
    assert!(!page.contains("innerHTML"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = spawn_test_api(Arc::new(MemoryBackend::new())).await;

    let response = server
        .client
        .get(server.url("/api/scores"))
        .header("Origin", "https://game.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
