//! Selective Writing · NSW writing-practice backend
//!
//! - Axum HTTP + WebSocket API
//! - Real-time weak-word highlighting and replacement suggestions
//! - NSW criteria feedback via OpenAI, with local fallbacks when it is absent
//! - Lesson catalogue, activity grading, drafts and progress history (in memory)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables OpenAI integration if present (VITE_OPENAI_API_KEY also accepted)
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL   : default "gpt-4o-mini"
//!   OPENAI_STRONG_MODEL : default "gpt-4o"
//!   WRITING_CONFIG_PATH : path to TOML config (prompts, extra weak words, extra lessons)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod analysis;
mod scoring;
mod config;
mod seeds;
mod vocabulary;
mod debounce;
mod lessons;
mod progress;
mod state;
mod protocol;
mod logic;
mod openai;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: drafts, progress history, vocabulary, lessons, OpenAI client, prompts.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "selective_writing", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
