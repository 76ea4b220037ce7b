//! Integration tests for ybk-ui API endpoints
//!
//! Tests cover:
//! - Health and public config endpoints
//! - Roster load, failure and reload
//! - Debounced search, sorting and pagination through HTTP
//! - Class photo gallery

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method
use ybk_common::config::{Settings, SERVICE_REQUIRED};
use ybk_common::events::EventBus;
use ybk_common::{QueryEngine, QuerySession};
use ybk_ui::source::RosterSource;
use ybk_ui::{build_router, AppState, LoadError, RosterStore};

const DEBOUNCE: Duration = Duration::from_millis(20);

/// Source returning queued results, repeating the last one
struct QueuedSource {
    results: Mutex<Vec<Result<Vec<Value>, String>>>,
}

#[async_trait]
impl RosterSource for QueuedSource {
    fn location(&self) -> &str {
        "test://people.json"
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        let mut results = self.results.lock().unwrap();
        let next = if results.len() > 1 {
            results.remove(0)
        } else {
            results[0].clone()
        };
        next.map_err(LoadError::Fetch)
    }
}

/// 25 students in two classes; ids 21120125120001..=21120125120025
fn roster() -> Vec<Value> {
    (1..=25)
        .map(|n| {
            json!({
                "studentId": format!("211201251200{:02}", n),
                "fullName": format!("Student {:02}", n),
                "nickname": format!("S{}", n),
                "city": if n % 2 == 0 { "Semarang" } else { "Solo" },
                "class": if n <= 12 { "A" } else { "B" },
                "formalphoto": if n == 1 {
                    "https://drive.google.com/file/d/abc123/view"
                } else {
                    ""
                },
            })
        })
        .collect()
}

fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| vars.get(key).cloned())
}

/// Test helper: app backed by queued results, loaded once
async fn setup_app_with(results: Vec<Result<Vec<Value>, String>>, settings: Settings) -> Router {
    let events = EventBus::new(64);
    let engine = QueryEngine::new(Vec::new())
        .with_page_size(10)
        .with_event_bus(events.clone());
    let session = QuerySession::new(engine, DEBOUNCE);
    let source = Arc::new(QueuedSource {
        results: Mutex::new(results),
    });
    let store = RosterStore::new(source, session, events.clone());
    let _ = store.load().await;

    let missing = settings.missing(&SERVICE_REQUIRED);
    build_router(AppState::new(store, settings, missing, events))
}

async fn setup_app() -> Router {
    setup_app_with(
        vec![Ok(roster())],
        settings(&[
            ("YEARBOOK_CLOUD_NAME", "demo"),
            ("YEARBOOK_CLOUD_API_KEY", "key"),
        ]),
    )
    .await
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: send request and extract status plus JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

fn ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["studentId"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health and config
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ybk-ui");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_config_complete() {
    let app = setup_app().await;
    let (status, body) = send(&app, test_request("GET", "/api/config")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Buku Angkatan 2025");
    assert_eq!(body["baseUrl"], "http://localhost:5173");
    assert_eq!(body["cloudName"], "demo");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["missingSettings"], json!([]));
}

#[tokio::test]
async fn test_config_degraded_lists_missing_settings() {
    let app = setup_app_with(vec![Ok(roster())], settings(&[])).await;
    let (_, body) = send(&app, test_request("GET", "/api/config")).await;

    assert_eq!(body["degraded"], true);
    assert_eq!(
        body["missingSettings"],
        json!(["YEARBOOK_CLOUD_NAME", "YEARBOOK_CLOUD_API_KEY"])
    );
    assert!(body["cloudName"].is_null());
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_initial_page() {
    let app = setup_app().await;
    let (status, body) = send(&app, test_request("GET", "/api/profiles")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["state"], "ready");
    assert_eq!(body["status"]["count"], 25);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["start"], 1);
    assert_eq!(body["pagination"]["end"], 10);
    assert_eq!(body["sortField"], "fullName");
    assert_eq!(body["sortDirection"], "asc");
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_image_urls_resolved() {
    let app = setup_app().await;
    let (_, first) = send(&app, test_request("GET", "/api/profiles/21120125120001")).await;
    assert_eq!(
        first["imageUrl"],
        "https://drive.google.com/uc?export=view&id=abc123"
    );

    let (_, second) = send(&app, test_request("GET", "/api/profiles/21120125120002")).await;
    assert_eq!(second["imageUrl"], "/images/default-avatar.svg");
}

#[tokio::test]
async fn test_unknown_profile_is_404() {
    let app = setup_app().await;
    let (status, body) = send(&app, test_request("GET", "/api/profiles/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_failed_load_then_reload() {
    let app = setup_app_with(
        vec![
            Err("HTTP error! status: 500".to_string()),
            Ok(roster()),
        ],
        settings(&[]),
    )
    .await;

    let (_, body) = send(&app, test_request("GET", "/api/profiles")).await;
    assert_eq!(body["status"]["state"], "failed");
    assert_eq!(
        body["status"]["message"],
        "Failed to load profiles: HTTP error! status: 500"
    );
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["totalPages"], 1);

    let (status, body) = send(&app, test_request("POST", "/api/profiles/load")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["state"], "ready");
    assert_eq!(body["pagination"]["total"], 25);
}

#[tokio::test]
async fn test_reload_failure_is_bad_gateway() {
    let app = setup_app_with(
        vec![Ok(roster()), Err("connection refused".to_string())],
        settings(&[]),
    )
    .await;

    let (status, body) = send(&app, test_request("POST", "/api/profiles/load")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "LOAD_FAILED");

    // Previous collection stays
    let (_, body) = send(&app, test_request("GET", "/api/profiles")).await;
    assert_eq!(body["pagination"]["total"], 25);
}

// =============================================================================
// Search, sort, paging
// =============================================================================

#[tokio::test]
async fn test_search_applies_after_debounce() {
    let app = setup_app().await;

    send(&app, json_request("POST", "/api/profiles/page", json!({"page": 3}))).await;

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/profiles/search", json!({"text": "student 1"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["searchText"], "student 1");
    assert_eq!(body["debouncedSearchText"], "");

    tokio::time::sleep(DEBOUNCE * 10).await;

    let (_, body) = send(&app, test_request("GET", "/api/profiles")).await;
    assert_eq!(body["debouncedSearchText"], "student 1");
    // "Student 10".."Student 19"
    assert_eq!(body["pagination"]["total"], 10);
    assert_eq!(body["pagination"]["currentPage"], 1);
}

#[tokio::test]
async fn test_clear_search() {
    let app = setup_app().await;

    send(
        &app,
        json_request("PUT", "/api/profiles/search", json!({"text": "Semarang"})),
    )
    .await;
    tokio::time::sleep(DEBOUNCE * 10).await;

    let (_, body) = send(&app, test_request("GET", "/api/profiles")).await;
    assert_eq!(body["pagination"]["total"], 12);

    let (status, body) = send(&app, test_request("DELETE", "/api/profiles/search")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["searchText"], "");
    assert_eq!(body["debouncedSearchText"], "");
    assert_eq!(body["pagination"]["total"], 25);
}

#[tokio::test]
async fn test_sort_descending_by_student_id() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/profiles/sort",
            json!({"field": "studentId", "direction": "desc"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sortField"], "studentId");
    assert_eq!(body["sortDirection"], "desc");
    assert_eq!(ids(&body)[0], "21120125120025");

    let (_, body) = send(&app, test_request("POST", "/api/profiles/sort/toggle")).await;
    assert_eq!(body["sortDirection"], "asc");
    assert_eq!(ids(&body)[0], "21120125120001");
}

#[tokio::test]
async fn test_sort_unknown_field_is_400() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        json_request("PUT", "/api/profiles/sort", json!({"field": "shoeSize"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_paging_bounds() {
    let app = setup_app().await;

    let (_, body) = send(&app, test_request("POST", "/api/profiles/page/prev")).await;
    assert_eq!(body["moved"], false);
    assert_eq!(body["pagination"]["currentPage"], 1);

    let (_, body) = send(&app, json_request("POST", "/api/profiles/page", json!({"page": 3}))).await;
    assert_eq!(body["moved"], true);
    assert_eq!(body["pagination"]["start"], 21);
    assert_eq!(body["pagination"]["end"], 25);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);

    let (_, body) = send(&app, test_request("POST", "/api/profiles/page/next")).await;
    assert_eq!(body["moved"], false);
    assert_eq!(body["pagination"]["currentPage"], 3);

    let (_, body) = send(&app, json_request("POST", "/api/profiles/page", json!({"page": 9}))).await;
    assert_eq!(body["moved"], false);
    assert_eq!(body["pagination"]["currentPage"], 3);

    let (_, body) = send(&app, test_request("POST", "/api/profiles/page/prev")).await;
    assert_eq!(body["moved"], true);
    assert_eq!(body["pagination"]["currentPage"], 2);
}

// =============================================================================
// Gallery
// =============================================================================

#[tokio::test]
async fn test_gallery_listing_and_lookup() {
    let app = setup_app().await;

    let (_, all) = send(&app, test_request("GET", "/api/gallery")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, events) = send(&app, test_request("GET", "/api/gallery?category=event")).await;
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], "orientation");

    let (status, _) = send(&app, test_request("GET", "/api/gallery/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
