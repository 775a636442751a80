//! Rosco · Game Backend
//!
//! - Axum HTTP + WebSocket API
//! - Question catalog from published spreadsheets, the local JSON fixture, or built-in seeds
//! - Static browser client fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   ROSCO_CONFIG_PATH  : path to TOML config (round rules, audio cues, sources)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use rosco_backend::config::load_config_from_env;
use rosco_backend::routes::build_router;
use rosco_backend::state::AppState;
use rosco_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Load config and the game catalog (remote sheets, fixture, or seeds).
  let config = load_config_from_env();
  let state = AppState::new(config).await;
  let _reaper = state.spawn_reaper();

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "rosco_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "rosco_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "rosco_backend", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
}
