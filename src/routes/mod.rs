//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - feedback, vocabulary, lesson and draft APIs under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Feedback
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/nsw", post(http::http_post_nsw))
        .route("/api/v1/progress", post(http::http_post_progress))
        .route("/api/v1/chat", post(http::http_post_chat))
        .route("/api/v1/analysis/structure", post(http::http_post_structure))
        // Vocabulary
        .route("/api/v1/vocabulary/highlights", post(http::http_post_highlights))
        .route("/api/v1/vocabulary/selection", post(http::http_post_selection))
        .route("/api/v1/vocabulary/suggestions", post(http::http_post_suggestions))
        .route("/api/v1/vocabulary/replace", post(http::http_post_replace))
        .route("/api/v1/vocabulary/transitions", post(http::http_post_transitions))
        .route("/api/v1/vocabulary/words", get(http::http_get_words))
        // Lessons
        .route("/api/v1/lessons", get(http::http_get_lessons))
        .route("/api/v1/lessons/:day", get(http::http_get_lesson))
        .route("/api/v1/lessons/:day/activities/:id", post(http::http_post_grade))
        .route("/api/v1/lessons/:day/checklist", post(http::http_post_checklist))
        // Drafts
        .route("/api/v1/drafts/:id", get(http::http_get_draft).put(http::http_put_draft))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
