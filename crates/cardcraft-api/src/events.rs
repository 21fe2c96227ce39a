//! Handlers for card analytics.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cards/{shortcode}/events` | Body: `{"kind":"page_view"}` |
//! | `GET`  | `/cards/{shortcode}/analytics` | Counts plus the latest events |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cardcraft_core::{
  card::CardSummary,
  event::{CardEvent, CardStats, EventKind, NewEvent},
  store::CardStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, RECENT_EVENTS_LIMIT, cards::find_card, error::ApiError};

// ─── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EventBody {
  pub kind:       EventKind,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
}

/// `POST /cards/{shortcode}/events`
pub async fn record<S>(
  State(state): State<ApiState<S>>,
  Path(shortcode): Path<String>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = find_card(state.store.as_ref(), &shortcode).await?;
  let event = state
    .store
    .record_event(card.card_id, NewEvent {
      kind:       body.kind,
      user_agent: body.user_agent,
      referrer:   body.referrer,
      ip_hash:    None,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Analytics ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Analytics {
  pub card:          CardSummary,
  pub stats:         CardStats,
  pub recent_events: Vec<CardEvent>,
}

/// `GET /cards/{shortcode}/analytics`
pub async fn analytics<S>(
  State(state): State<ApiState<S>>,
  Path(shortcode): Path<String>,
) -> Result<Json<Analytics>, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = find_card(state.store.as_ref(), &shortcode).await?;
  let stats = state.store.stats(card.card_id).await.map_err(ApiError::store)?;
  let recent_events = state
    .store
    .recent_events(card.card_id, RECENT_EVENTS_LIMIT)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(Analytics {
    card: card.summary(),
    stats,
    recent_events,
  }))
}
