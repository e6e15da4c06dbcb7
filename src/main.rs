//! Bandplan · IELTS Study-Plan Backend
//!
//! - Axum HTTP API (plan generation + task-bank browsing)
//! - Optional AI plan provider (DeepSeek / Gemini, via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   DEEPSEEK_API_KEY  : enables the DeepSeek plan provider if present
//!   DEEPSEEK_BASE_URL : default "https://api.deepseek.com/v1"
//!   DEEPSEEK_MODEL    : default "deepseek-chat"
//!   GEMINI_API_KEY    : enables the Gemini plan provider if present
//!   GEMINI_MODEL      : default "gemini-2.5-flash"
//!   PLAN_CONFIG_PATH  : path to TOML config (prompts + optional task bank)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod rng;
mod bank;
mod locale;
mod plan;
mod ai;
mod state;
mod protocol;
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

  // Build shared application state (task bank, prompts, AI client).
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
  info!(target: "bandplan_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
