//! JSON REST API for CardCraft.
//!
//! Exposes an axum [`Router`] backed by any [`cardcraft_core::store::CardStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cardcraft_api::api_router(store.clone(), "https://cards.example"))
//! ```

pub mod cards;
pub mod error;
pub mod events;
pub mod render;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cardcraft_core::{shortcode::ShortCode, store::CardStore};

pub use error::ApiError;

/// How many events `GET /cards/{shortcode}/analytics` returns.
pub const RECENT_EVENTS_LIMIT: usize = 10;

/// Shared handler state: the store plus the public origin used to build share
/// links.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub base_url: Arc<str>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, base_url: &str) -> Self {
    Self {
      store,
      base_url: Arc::from(base_url.trim_end_matches('/')),
    }
  }

  /// The public link a visitor opens to download `shortcode`.
  pub fn share_url(&self, shortcode: &ShortCode) -> String {
    share_url(&self.base_url, shortcode)
  }
}

// Derived `Clone` would require `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      base_url: Arc::clone(&self.base_url),
    }
  }
}

/// `<base_url>/c/<shortcode>`
pub fn share_url(base_url: &str, shortcode: &ShortCode) -> String {
  format!("{}/c/{shortcode}", base_url.trim_end_matches('/'))
}

/// A `Content-Disposition` value offering `filename` as a download.
///
/// Quotes, backslashes and control characters are replaced so the header
/// stays well formed whatever the contact's name is.
pub fn attachment_disposition(filename: &str) -> String {
  let safe: String = filename
    .chars()
    .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
    .collect();
  format!("attachment; filename=\"{safe}\"")
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, base_url: &str) -> Router<()>
where
  S: CardStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Rendering
    .route("/render", post(render::render))
    .route("/qr", post(render::qr))
    // Cards
    .route("/cards", get(cards::list::<S>).post(cards::create::<S>))
    .route("/cards/{shortcode}", get(cards::get_one::<S>))
    .route("/cards/{shortcode}/vcard", get(cards::vcard::<S>))
    .route("/cards/{shortcode}/qr", get(cards::qr::<S>))
    // Analytics
    .route("/cards/{shortcode}/events", post(events::record::<S>))
    .route("/cards/{shortcode}/analytics", get(events::analytics::<S>))
    .with_state(ApiState::new(store, base_url))
}
