//! The `CardStore` trait.
//!
//! Implemented by storage backends (e.g. `cardcraft-store-sqlite`). The API
//! and server depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  card::{CardSummary, StoredCard},
  event::{CardEvent, CardStats, NewEvent},
  record::ContactRecord,
  shortcode::ShortCode,
};

/// How many fresh short codes a backend tries before giving up.
pub const SHORT_CODE_ATTEMPTS: u32 = 8;

/// Abstraction over a card store backend.
///
/// Cards are written once; events are append-only. All methods return `Send`
/// futures so the trait can be used from a multi-threaded runtime.
pub trait CardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Persist `record` under a freshly allocated short code.
  fn create_card(
    &self,
    record: ContactRecord,
    session_id: Option<String>,
  ) -> impl Future<Output = Result<StoredCard, Self::Error>> + Send + '_;

  /// Retrieve a card by id. Returns `None` if not found.
  fn get_card(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Option<StoredCard>, Self::Error>> + Send + '_;

  /// Retrieve a card by short code. Returns `None` if not found.
  fn get_card_by_shortcode<'a>(
    &'a self,
    shortcode: &'a ShortCode,
  ) -> impl Future<Output = Result<Option<StoredCard>, Self::Error>> + Send + 'a;

  /// Cards created by `session_id`, newest first.
  fn list_cards<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Vec<CardSummary>, Self::Error>> + Send + 'a;

  // ── Events ────────────────────────────────────────────────────────────

  /// Append an event for `card_id`. The timestamp is set by the store.
  fn record_event(
    &self,
    card_id: Uuid,
    event: NewEvent,
  ) -> impl Future<Output = Result<CardEvent, Self::Error>> + Send + '_;

  /// Aggregate event counts for `card_id`.
  fn stats(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<CardStats, Self::Error>> + Send + '_;

  /// The `limit` most recent events for `card_id`, newest first.
  fn recent_events(
    &self,
    card_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CardEvent>, Self::Error>> + Send + '_;
}
