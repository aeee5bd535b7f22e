//! BioTrack · Animal Catalogue & Quiz Backend
//!
//! - Axum HTTP + WebSocket API over an in-memory animal dataset
//! - Name resolution with singular fallback, status/habitat statistics,
//!   conservation-status quiz, image identification via an external classifier
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 8000)
//!   DATASET_URL          : remote JSON array of animal rows (preferred when set)
//!   DATASET_PATH         : local .json or .csv dataset (built-in seeds if neither is set)
//!   CLASSIFIER_URL       : enables image identification if present
//!   BIOTRACK_CONFIG_PATH : path to TOML config (quiz, stats, provider tuning)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod aggregate;
mod bridge;
mod catalog;
mod classifier;
mod config;
mod domain;
mod error;
mod logic;
mod protocol;
mod provider;
mod quiz;
mod resolver;
mod routes;
mod seeds;
mod session;
mod state;
mod store;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Load config + dataset once; the record store is read-only from here on.
  let state = Arc::new(AppState::from_env().await);
  state.spawn_quiz_sweeper();

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 8000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "biotrack_backend", %addr, animals = state.store.len(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
