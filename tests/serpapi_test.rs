use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use topic_digest::core::config::{SearchConfig, ENV_SERPAPI_API_KEY};
use topic_digest::core::error::SearchError;
use topic_digest::search::{SearchProvider, SerpApiProvider};

#[derive(Default)]
struct FakeSerpApi {
    hits: AtomicUsize,
}

async fn search_json(
    State(fake): State<Arc<FakeSerpApi>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<serde_json::Value>) {
    fake.hits.fetch_add(1, Ordering::SeqCst);

    if params.get("api_key").map(String::as_str) != Some("test-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key" })),
        );
    }
    assert_eq!(params.get("engine").map(String::as_str), Some("google"));

    let body = match params.get("q").map(String::as_str) {
        Some("nothing at all") => serde_json::json!({
            "search_metadata": { "status": "Success" },
            "error": "Google hasn't returned any results for this query."
        }),
        _ => serde_json::json!({
            "search_metadata": { "status": "Success" },
            "organic_results": [
                { "position": 1, "link": "https://www.rust-lang.org/" },
                { "position": 2, "title": "Sponsored widget" },
                { "position": 3, "link": "https://doc.rust-lang.org/book/" },
                { "position": 4, "link": "https://en.wikipedia.org/wiki/Rust_(programming_language)" }
            ]
        }),
    };
    (StatusCode::OK, Json(body))
}

async fn spawn_fake() -> (Arc<FakeSerpApi>, String) {
    let fake = Arc::new(FakeSerpApi::default());
    let app = Router::new()
        .route("/search.json", get(search_json))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (fake, format!("http://{}/search.json", addr))
}

fn provider(base_url: &str, api_key: Option<&str>) -> SerpApiProvider {
    SerpApiProvider::new(
        reqwest::Client::new(),
        SearchConfig {
            api_key: api_key.map(str::to_string),
            base_url: Some(base_url.to_string()),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn organic_links_are_returned_in_order() {
    let (fake, base) = spawn_fake().await;
    let links = provider(&base, Some("test-key"))
        .search("rust language", 5)
        .await
        .unwrap();
    assert_eq!(
        links,
        vec![
            "https://www.rust-lang.org/",
            "https://doc.rust-lang.org/book/",
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        ]
    );
    assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn links_are_capped_at_the_requested_count() {
    let (_fake, base) = spawn_fake().await;
    let links = provider(&base, Some("test-key")).search("rust", 2).await.unwrap();
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn provider_no_results_reply_is_an_empty_list() {
    let (_fake, base) = spawn_fake().await;
    let links = provider(&base, Some("test-key"))
        .search("nothing at all", 5)
        .await
        .unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn rejected_key_is_an_api_error_with_the_provider_message() {
    let (_fake, base) = spawn_fake().await;
    let err = provider(&base, Some("wrong")).search("rust", 5).await.unwrap_err();
    match err {
        SearchError::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Invalid API key."));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    std::env::remove_var(ENV_SERPAPI_API_KEY);
    let (fake, base) = spawn_fake().await;
    let err = provider(&base, None).search("rust", 5).await.unwrap_err();
    assert_eq!(err, SearchError::MissingApiKey);
    assert_eq!(fake.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_endpoint_does_not_leak_the_key() {
    let err = provider("http://127.0.0.1:9/search.json", Some("secret-key-123"))
        .search("rust", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Request(_)));
    assert!(!err.to_string().contains("secret-key-123"));
}
