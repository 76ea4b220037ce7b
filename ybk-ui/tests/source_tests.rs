//! Integration tests for the HTTP roster source
//!
//! Each test serves a roster from a local stand-in server and fetches it
//! through `HttpRosterSource`.

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use ybk_ui::source::{HttpRosterSource, RosterSource};
use ybk_ui::LoadError;

/// Serve `app` on an ephemeral port and return the roster URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/data/people.json", addr)
}

async fn fetch(app: Router) -> Result<Vec<Value>, LoadError> {
    let url = serve(app).await;
    HttpRosterSource::new(url).unwrap().fetch().await
}

#[tokio::test]
async fn test_http_source_returns_entries() {
    let app = Router::new().route(
        "/data/people.json",
        get(|| async {
            Json(json!([
                {"studentId": "21120125120002", "fullName": "Ayu Lestari"},
                {"studentId": "21120125120003", "fullName": "Budi Santoso"}
            ]))
        }),
    );

    let entries = fetch(app).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["fullName"], "Budi Santoso");
}

#[tokio::test]
async fn test_http_source_error_status() {
    let app = Router::new().route(
        "/data/people.json",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );

    let err = fetch(app).await.unwrap_err();
    assert!(matches!(err, LoadError::Fetch(_)));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_http_source_not_found_status() {
    let err = fetch(Router::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 404");
}

#[tokio::test]
async fn test_http_source_rejects_object_payload() {
    let app = Router::new().route(
        "/data/people.json",
        get(|| async { Json(json!({"people": []})) }),
    );

    let err = fetch(app).await.unwrap_err();
    assert!(matches!(err, LoadError::MalformedPayload(_)));
    assert_eq!(err.to_string(), "Invalid data format: expected an array");
}

#[tokio::test]
async fn test_http_source_rejects_non_json_body() {
    let app = Router::new().route(
        "/data/people.json",
        get(|| async { "<html>not a roster</html>" }),
    );

    let err = fetch(app).await.unwrap_err();
    assert!(matches!(err, LoadError::MalformedPayload(_)));
}
