pub mod render;

use crate::core::error::DigestError;
use crate::core::types::{DigestRequest, DigestResponse, ErrorResponse, TopicForm};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use render::{render_page, PageView};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(digest_form_handler))
        .route("/health", get(health_check))
        .route("/api/digest", post(digest_api_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(err: &DigestError) -> StatusCode {
    match err {
        DigestError::MissingTopic => StatusCode::BAD_REQUEST,
        DigestError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        DigestError::Search(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "topic-digest",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn digest_form_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TopicForm>,
) -> Html<String> {
    let topic = form.topic.unwrap_or_default();
    match state.digest.digest(&topic).await {
        Ok(digest) => Html(render_page(&PageView::from(&digest))),
        Err(e) => {
            warn!("Digest failed for '{}': {}", topic.trim(), e);
            let message = e.to_string();
            let shown = Some(topic.trim()).filter(|t| !t.is_empty());
            Html(render_page(&PageView::error(shown, &message)))
        }
    }
}

async fn digest_api_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DigestRequest>,
) -> Result<Json<DigestResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.digest.digest(&request.topic).await {
        Ok(digest) => Ok(Json(DigestResponse::from(digest))),
        Err(e) => {
            error!("Digest error: {}", e);
            Err((
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SearchError;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(status_for(&DigestError::MissingTopic), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&DigestError::MissingApiKey),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DigestError::Search(SearchError::Request("timeout".into()))),
            StatusCode::BAD_GATEWAY
        );
    }
}
