//! ScienceSpark · NSW Science Tutor Backend
//!
//! - Axum HTTP + WebSocket API
//! - Optional OpenAI-compatible AI integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                        : u16 (default 3000)
//!   OPENAI_API_KEY              : enables AI integration if present
//!   OPENAI_BASE_URL             : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL           : default "gpt-4o-mini"
//!   OPENAI_STRONG_MODEL         : default "gpt-4o"
//!   AGENT_CONFIG_PATH           : path to TOML config (prompt overrides)
//!   CACHE_DIR                   : resource cache directory (default ./cache)
//!   RESOURCE_CACHE_MAX_AGE_HOURS: cached bundle lifetime (default 168)
//!   LOG_LEVEL                   : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                  : "pretty" (default) or "json"

mod ai;
mod cache;
mod catalogue;
mod chat;
mod config;
mod domain;
mod error;
mod progress;
mod protocol;
mod quiz;
mod resources;
mod routes;
mod state;
mod store;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Build shared application state (in-memory stores, AI client, prompts).
    let state = Arc::new(AppState::new());

    // Build the HTTP router with routes, CORS and tracing layers.
    let app = build_router(state.clone());

    // Read port from env or default to 3000.
    let addr: SocketAddr = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

    let listener = TcpListener::bind(addr).await?;
    info!(target: "sciencespark_backend", %addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
