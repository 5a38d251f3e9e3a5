//! LeetDaily · daily practice picker backend
//!
//! - Axum HTTP + WebSocket chat API
//! - Per-user catalog snapshots, quotas and session cookies (memory or JSON files)
//! - Random daily selection of unsolved problems per difficulty
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   LEETDAILY_CONFIG_PATH : path to TOML config (see `config.rs`)
//!   DATA_DIR              : directory for the file stores (default ./data)
//!   STORAGE_BACKEND       : "file" (default) or "memory"
//!   LEETCODE_GRAPHQL_URL  : catalog endpoint override
//!   FETCH_TIMEOUT_SECS    : catalog request timeout (default 20)
//!   SAMPLING_SEED         : fixed RNG seed for reproducible picks
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod store;
mod selector;
mod fetcher;
mod orchestrator;
mod chat;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = AppConfig::load();

  // Build shared application state (stores, catalog client, sampler).
  let state = Arc::new(AppState::from_config(&cfg)?);

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "leetdaily", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "leetdaily", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "leetdaily", error = %e, "Failed to listen for Ctrl-C; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "leetdaily", "Shutdown signal received");
}
