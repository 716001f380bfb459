use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use topic_digest::core::cache::SummaryCache;
use topic_digest::core::config::DigestConfig;
use topic_digest::core::error::SearchError;
use topic_digest::digest::DigestService;
use topic_digest::nlp::Summarizer;
use topic_digest::scraping::PageSource;
use topic_digest::search::SearchProvider;
use topic_digest::{web, AppState, CacheEntry, DigestResponse, ErrorResponse};
use tower::ServiceExt;

struct FixedSearch(Result<Vec<String>, SearchError>);

#[async_trait]
impl SearchProvider for FixedSearch {
    async fn search(&self, _topic: &str, _num_results: usize) -> Result<Vec<String>, SearchError> {
        self.0.clone()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct NoPages;

#[async_trait]
impl PageSource for NoPages {
    async fn scrape(&self, _url: &str) -> Option<String> {
        None
    }
}

/// Long generated pages; `scraped` fires once every expected page has been served.
struct LongPages {
    expected: usize,
    served: AtomicUsize,
    scraped: Arc<Notify>,
}

fn long_page(page: usize) -> String {
    const LETTERS: &[u8] = b"bdfgklmnprstvz";
    let word = |n: usize| -> String {
        let a = LETTERS[n % LETTERS.len()] as char;
        let b = LETTERS[(n / LETTERS.len()) % LETTERS.len()] as char;
        let c = LETTERS[(n / 196) % LETTERS.len()] as char;
        format!("{a}a{b}o{c}e")
    };
    (0..400)
        .map(|i| {
            let id = page * 400 + i;
            let mut words: Vec<String> = (0..17).map(|j| word((id * 31 + j * 97) % 2744)).collect();
            words.push(format!("{}{}", word(id), word(id / 2744)));
            words[0][..1].make_ascii_uppercase();
            format!("{}.", words.join(" "))
        })
        .collect::<Vec<_>>()
        .chunks(8)
        .map(|chunk| chunk.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl PageSource for LongPages {
    async fn scrape(&self, url: &str) -> Option<String> {
        let page = url.trim_start_matches("https://long.example/").parse().unwrap_or(0);
        if self.served.fetch_add(1, Ordering::SeqCst) + 1 == self.expected {
            self.scraped.notify_one();
        }
        Some(long_page(page))
    }
}

async fn app(search: Result<Vec<String>, SearchError>) -> axum::Router {
    let cache = SummaryCache::new(10);
    cache
        .insert(
            "who is create you",
            CacheEntry {
                summary: vec!["His name is Vishal".to_string()],
                error: None,
                urls_found: vec!["novix-chat-3.onrender.com".to_string()],
            },
        )
        .await;
    let digest = DigestService::new(
        Arc::new(FixedSearch(search)),
        Arc::new(NoPages),
        Arc::new(Summarizer::english().unwrap()),
        cache,
    );
    web::router(Arc::new(AppState::from_parts(DigestConfig::default(), digest)))
}

fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/digest")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_service_status() {
    let response = app(Ok(vec![]))
        .await
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "topic-digest");
}

#[tokio::test]
async fn index_renders_the_form() {
    let response = app(Ok(vec![]))
        .await
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("name=\"topic\""));
}

#[tokio::test]
async fn api_serves_cached_topics() {
    let response = app(Err(SearchError::MissingApiKey))
        .await
        .oneshot(json_request(serde_json::json!({ "topic": "who is create you" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let digest: DigestResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(digest.topic, "who is create you");
    assert_eq!(digest.summary, vec!["His name is Vishal"]);
    assert_eq!(digest.error, None);
    assert!(digest.cached);
}

#[tokio::test]
async fn api_error_statuses() {
    let cases = [
        (Ok(vec![]), "", StatusCode::BAD_REQUEST),
        (Err(SearchError::MissingApiKey), "rust", StatusCode::SERVICE_UNAVAILABLE),
        (
            Err(SearchError::Request("connection reset".to_string())),
            "rust",
            StatusCode::BAD_GATEWAY,
        ),
    ];
    for (search, topic, expected) in cases {
        let response = app(search)
            .await
            .oneshot(json_request(serde_json::json!({ "topic": topic })))
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "topic {topic:?}");
        let err: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(!err.error.is_empty());
    }
}

#[tokio::test]
async fn api_reports_no_results_as_a_cached_outcome() {
    let response = app(Ok(vec![]))
        .await
        .oneshot(json_request(serde_json::json!({ "topic": "qwzxplk" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let digest: DigestResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(digest.summary.is_empty());
    assert!(digest.error.is_some());
    assert!(!digest.cached);
}

#[tokio::test]
async fn form_without_topic_shows_the_prompt() {
    let response = app(Ok(vec![])).await.oneshot(form_request("topic=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(&ammonia::clean_text("Please enter a topic.")));
}

#[tokio::test]
async fn form_renders_cached_summary() {
    let response = app(Ok(vec![]))
        .await
        .oneshot(form_request("topic=who+is+create+you"))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains(&ammonia::clean_text("His name is Vishal")));
    assert!(html.contains("novix-chat-3.onrender.com"));
}

#[tokio::test]
async fn health_answers_while_a_long_digest_is_summarized() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://long.example/{i}")).collect();
    let scraped = Arc::new(Notify::new());
    let digest = DigestService::new(
        Arc::new(FixedSearch(Ok(urls.clone()))),
        Arc::new(LongPages {
            expected: urls.len(),
            served: AtomicUsize::new(0),
            scraped: Arc::clone(&scraped),
        }),
        Arc::new(Summarizer::english().unwrap().with_reduction_ratio(0.0)),
        SummaryCache::new(10),
    );
    let router = web::router(Arc::new(AppState::from_parts(DigestConfig::default(), digest)));

    let pending = tokio::spawn(
        router
            .clone()
            .oneshot(json_request(serde_json::json!({ "topic": "long pages" }))),
    );
    scraped.notified().await;

    let health = tokio::time::timeout(
        Duration::from_secs(2),
        router.oneshot(Request::get("/health").body(Body::empty()).unwrap()),
    )
    .await
    .expect("health request timed out")
    .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert!(!pending.is_finished(), "digest finished before health was served");

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: DigestResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!body.summary.is_empty());
    assert!(body.summary.len() <= 5);
    assert_eq!(body.urls_found, urls);
}
