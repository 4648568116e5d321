use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{connect_info::MockConnectInfo, Query},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use iconseek_core::{IconRecord, KeyValueStore, MemoryStore, StorageError, FAVORITE_IDS_KEY};
use iconseek_search::{ProxyClient, SearchSession, UpstreamClient};
use iconseek_server::{create_router, AppState};

/// Create a test app over in-memory storage and the given upstream client.
fn create_test_app_with(storage: Arc<MemoryStore>, upstream: UpstreamClient) -> Router {
    let state = AppState::new(storage, upstream);
    create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
}

/// Storage whose writes can be switched off.
#[derive(Default)]
struct SwitchableStore {
    inner: MemoryStore,
    read_only: AtomicBool,
}

impl KeyValueStore for SwitchableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key)
    }
}

/// Test app whose upstream is never reachable.
fn create_test_app() -> Router {
    create_test_app_with(
        Arc::new(MemoryStore::new()),
        UpstreamClient::new("http://127.0.0.1:1", Some("test-key".to_string())),
    )
}

/// Fake upstream search API. "boom" fails with 503; anything else returns one icon.
async fn fake_search(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("query").cloned().unwrap_or_default();
    if query == "boom" {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }
    Json(json!({
        "total_count": 1,
        "icons": [{
            "icon_id": 42,
            "tags": [query, "animal"],
            "raster_sizes": [{
                "size": 64,
                "formats": [{"format": "png", "preview_url": "https://cdn.example/42.png"}]
            }]
        }]
    }))
    .into_response()
}

async fn spawn_upstream() -> String {
    let app = Router::new().route("/icons/search", get(fake_search));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn create_upstream_app() -> Router {
    let base = spawn_upstream().await;
    create_test_app_with(
        Arc::new(MemoryStore::new()),
        UpstreamClient::new(base, Some("test-key".to_string())),
    )
}

/// Helper to get response body as string.
async fn body_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_string(body).await).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

// ============================================================================
// Health endpoint tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["favorites"], 0);
    assert_eq!(json["upstream_configured"], true);
}

#[tokio::test]
async fn test_ready_reports_failed_writes() {
    let storage = Arc::new(SwitchableStore::default());
    let state = AppState::new(
        storage.clone(),
        UpstreamClient::new("http://127.0.0.1:1", None),
    );
    let app = create_router(state)
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

    storage.read_only.store(true, Ordering::SeqCst);
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/favorites", json!({"id": "1", "name": "cat"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get_request("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["favorites"], 1);

    storage.read_only.store(false, Ordering::SeqCst);
    app.clone()
        .oneshot(json_request("POST", "/api/favorites", json!({"id": "2", "name": "dog"})))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["favorites"], 2);
    assert_eq!(storage.get(FAVORITE_IDS_KEY).unwrap().as_deref(), Some(r#"["1","2"]"#));
}

// ============================================================================
// Search proxy tests
// ============================================================================

#[tokio::test]
async fn test_proxy_missing_query() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/api/icons?q=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"error":"Missing query or API key"}"#);
}

#[tokio::test]
async fn test_proxy_missing_api_key() {
    let app = create_test_app_with(
        Arc::new(MemoryStore::new()),
        UpstreamClient::new("http://127.0.0.1:1", None),
    );

    let response = app.oneshot(get_request("/api/icons?q=dog")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"error":"Missing query or API key"}"#);
}

#[tokio::test]
async fn test_proxy_passes_results_through() {
    let app = create_upstream_app().await;

    let response = app.oneshot(get_request("/api/icons?q=dog")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["icons"][0]["icon_id"], 42);
    assert_eq!(json["icons"][0]["tags"][0], "dog");
}

#[tokio::test]
async fn test_proxy_forwards_upstream_status() {
    let app = create_upstream_app().await;

    let response = app.oneshot(get_request("/api/icons?q=boom")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"error":"Failed to fetch icons"}"#);
}

#[tokio::test]
async fn test_proxy_unreachable_upstream() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/api/icons?q=dog")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"error":"Failed to fetch icons"}"#);
}

#[tokio::test]
async fn test_proxy_rate_limit() {
    let app = create_test_app();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(get_request("/api/icons?q="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app.oneshot(get_request("/api/icons?q=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_proxy_client_against_running_server() {
    let upstream = spawn_upstream().await;
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        UpstreamClient::new(upstream, Some("test-key".to_string())),
    );
    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ProxyClient::new(format!("http://{}", addr));
    let mut session = SearchSession::new();

    assert!(session.run(&client, "dog").await);
    assert_eq!(session.error(), None);
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.results()[0].first_tag(), Some("dog"));

    assert!(session.run(&client, "boom").await);
    assert!(session.results().is_empty());
    assert_eq!(session.error(), Some("Failed to fetch icons (HTTP 503)"));
}

// ============================================================================
// Favorites API tests
// ============================================================================

#[tokio::test]
async fn test_add_list_and_delete_favorite() {
    let storage = Arc::new(MemoryStore::new());
    let app = create_test_app_with(
        storage.clone(),
        UpstreamClient::new("http://127.0.0.1:1", None),
    );
    let icon = json!({"icon_id": 42, "tags": ["dog"]});

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/favorites", icon.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "added");
    assert_eq!(json["id"], "42");

    // Adding again changes nothing
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/favorites", icon))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "exists");

    let response = app
        .clone()
        .oneshot(get_request("/api/favorites"))
        .await
        .unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["ids"], json!(["42"]));
    assert_eq!(json["icons"].as_array().unwrap().len(), 1);
    assert_eq!(
        storage.get(FAVORITE_IDS_KEY).unwrap().as_deref(),
        Some(r#"["42"]"#)
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/favorites/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "removed");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/favorites/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_favorite_without_native_id() {
    let app = create_test_app();
    let request = || {
        json_request(
            "POST",
            "/api/favorites/toggle",
            json!({"icon": {"name": "dog", "tags": ["pet"]}, "index": 3}),
        )
    };

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "added");
    assert_eq!(json["id"], "dog-pet-3");

    let response = app.oneshot(request()).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "removed");
    assert_eq!(json["id"], "dog-pet-3");
}

#[tokio::test]
async fn test_favorites_loaded_from_storage() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set_many(&[
            (FAVORITE_IDS_KEY, r#"["7"]"#),
            ("favoriteIconsData", r#"[{"id": 7, "name": "cat"}]"#),
        ])
        .unwrap();
    let app = create_test_app_with(storage, UpstreamClient::new("http://127.0.0.1:1", None));

    let response = app.oneshot(get_request("/api/favorites")).await.unwrap();

    let json = body_json(response.into_body()).await;
    assert_eq!(json["ids"], json!(["7"]));
    assert_eq!(json["icons"][0]["name"], "cat");
}

// ============================================================================
// Page tests
// ============================================================================

#[tokio::test]
async fn test_index_page() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response.into_body()).await;
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains(r#"action="/search""#));
}

#[tokio::test]
async fn test_search_page_blank_query_issues_no_search() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/search?q=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response.into_body()).await;
    assert!(!body.contains(r#"class="error""#));
    assert!(!body.contains("results for"));
}

#[tokio::test]
async fn test_search_page_shows_results() {
    let app = create_upstream_app().await;

    let response = app.oneshot(get_request("/search?q=dog")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response.into_body()).await;
    assert!(body.contains(r#"1 results for "dog""#));
    assert!(body.contains("https://cdn.example/42.png"));
    assert!(body.contains("Add to favorites"));
    assert!(body.contains(r#"value="/search?q=dog""#));
}

#[tokio::test]
async fn test_search_page_shows_error_message() {
    let app = create_upstream_app().await;

    let response = app.oneshot(get_request("/search?q=boom")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response.into_body()).await;
    assert!(body.contains(r#"class="error""#));
    assert!(body.contains("HTTP 503"));
}

#[tokio::test]
async fn test_favorites_page_empty() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/favorites")).await.unwrap();

    let body = body_string(response.into_body()).await;
    assert!(body.contains("Favorites (0)"));
    assert!(body.contains("No favorites yet"));
}

// ============================================================================
// Form tests
// ============================================================================

#[tokio::test]
async fn test_form_toggle_redirects_back() {
    let app = create_test_app();
    let icon = serde_json::to_string(&IconRecord::new("dog").with_tags(["pet"])).unwrap();

    let response = app
        .clone()
        .oneshot(form_request(
            "/favorites/toggle",
            &[
                ("icon", icon.as_str()),
                ("index", "0"),
                ("return_to", "/search?q=dog"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/search?q=dog");

    let response = app.oneshot(get_request("/favorites")).await.unwrap();
    let body = body_string(response.into_body()).await;
    assert!(body.contains("Favorites (1)"));
    assert!(body.contains(r#"value="dog-pet-0""#));
}

#[tokio::test]
async fn test_form_toggle_rejects_bad_icon() {
    let app = create_test_app();

    let response = app
        .oneshot(form_request("/favorites/toggle", &[("icon", "not json")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_form_remove_redirects_to_favorites() {
    let app = create_test_app();
    let add = json_request("POST", "/api/favorites", json!({"id": "abc", "name": "cat"}));
    app.clone().oneshot(add).await.unwrap();

    let response = app
        .clone()
        .oneshot(form_request("/favorites/remove", &[("id", "abc")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/favorites");

    let response = app.oneshot(get_request("/api/favorites")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["ids"], json!([]));
}
