//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS,
//! and HTTP tracing.

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
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) - adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/topics", get(http::http_list_topics))
        .route(
            "/api/v1/topics/current",
            get(http::http_get_current_topic).put(http::http_set_current_topic),
        )
        .route("/api/v1/chat/sessions", get(http::http_list_sessions))
        .route("/api/v1/chat/session", post(http::http_start_session))
        .route("/api/v1/chat/messages", get(http::http_list_messages))
        .route("/api/v1/chat/message", post(http::http_send_message))
        .route("/api/v1/quizzes", get(http::http_list_quizzes))
        .route("/api/v1/quiz/generate", post(http::http_generate_quiz))
        .route("/api/v1/quiz/submit", post(http::http_submit_quiz))
        .route("/api/v1/quiz/feedback", post(http::http_quiz_feedback))
        .route("/api/v1/resources", get(http::http_get_resources))
        .route("/api/v1/resources/generate", post(http::http_generate_resources))
        .route("/api/v1/progress/dashboard", get(http::http_dashboard))
        .route("/api/v1/progress/outcomes", get(http::http_outcomes))
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
