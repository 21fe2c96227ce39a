//! HTTP front end for CardCraft.
//!
//! Serves public share links at `/c/{shortcode}` and nests the JSON API from
//! [`cardcraft_api`] under `/api`, backed by any [`CardStore`].

pub mod error;
pub mod etag;
pub mod share;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::Method, routing::get};
use cardcraft_core::store::CardStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CARDCRAFT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Public origin used when building share links.
  pub base_url:   String,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       8080,
      base_url:   "http://localhost:8080".to_string(),
      store_path: PathBuf::from("cardcraft.db"),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CardStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CardStore + Clone + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = cardcraft_api::api_router(Arc::clone(&state.store), &state.config.base_url);

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers(Any);

  Router::new()
    .route("/c/{shortcode}", get(share::handler::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
