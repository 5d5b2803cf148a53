//! Nomenquiz · IUPAC Nomenclature Quiz Backend
//!
//! - Axum HTTP + WebSocket API
//! - Structure rendering (skeletal / full structural SVG, condensed text)
//! - Optional OpenAI-compatible explanations for wrong answers
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                     : u16 (default 3000)
//!   OPENAI_API_KEY           : enables AI explanations if present
//!   OPENAI_BASE_URL          : default "https://api.openai.com/v1"
//!   OPENAI_MODEL             : default "gpt-4o-mini"
//!   EXPLANATION_TIMEOUT_SECS : bound on one explanation call (default 10)
//!   SESSION_TTL_SECS         : idle HTTP sessions are dropped after this (default 7200)
//!   AGENT_CONFIG_PATH        : path to TOML config (prompts + optional extra compounds)
//!   LOG_LEVEL                : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT               : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod smiles;
mod render;
mod matcher;
mod bank;
mod session;
mod explain;
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

  // Build shared application state (validated bank, session store, OpenAI client, prompts).
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
  info!(target: "nomenquiz", %addr, compounds = state.bank.len(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "nomenquiz", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "nomenquiz", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
