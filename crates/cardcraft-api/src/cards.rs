//! Handlers for `/cards` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cards` | `?session_id=<id>` lists that session's cards |
//! | `POST` | `/cards` | Body: [`CreateBody`]; 400 if the record has no name |
//! | `GET`  | `/cards/{shortcode}` | 404 if not found |
//! | `GET`  | `/cards/{shortcode}/vcard` | Optional `?include_photo=false` |
//! | `GET`  | `/cards/{shortcode}/qr` | Optional `?encoding=plain_text` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use cardcraft_core::{
  Error,
  card::{CardSummary, StoredCard},
  record::ContactRecord,
  shortcode::ShortCode,
  store::CardStore,
};
use cardcraft_vcard::{CONTENT_TYPE, SerializeOptions, download_filename, serialize};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState, attachment_disposition,
  error::ApiError,
  render::{QrFormat, qr_response},
};

/// Resolve a path segment to a stored card: 400 if it is not a short code,
/// 404 if no card carries it.
pub(crate) async fn find_card<S>(store: &S, raw: &str) -> Result<StoredCard, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let code = ShortCode::parse(raw)?;
  store
    .get_card_by_shortcode(&code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("card {code} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub session_id: String,
}

/// `GET /cards?session_id=<id>`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CardSummary>>, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cards = state
    .store
    .list_cards(&params.session_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(cards))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub record:     ContactRecord,
  pub session_id: Option<String>,
  /// Set when the client already saved this record; the stored card is
  /// returned instead of minting a second short code.
  pub card_id:    Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
  pub card:      StoredCard,
  pub share_url: String,
}

/// `POST /cards`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !body.record.is_nameable() {
    return Err(Error::NotNameable.into());
  }

  if let Some(card_id) = body.card_id
    && let Some(card) = state.store.get_card(card_id).await.map_err(ApiError::store)?
  {
    let share_url = state.share_url(&card.shortcode);
    return Ok((StatusCode::OK, Json(CreateResponse { card, share_url })));
  }

  let card = state
    .store
    .create_card(body.record, body.session_id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(card_id = %card.card_id, shortcode = %card.shortcode, "card shared");

  let share_url = state.share_url(&card.shortcode);
  Ok((StatusCode::CREATED, Json(CreateResponse { card, share_url })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /cards/{shortcode}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(shortcode): Path<String>,
) -> Result<Json<StoredCard>, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = find_card(state.store.as_ref(), &shortcode).await?;
  Ok(Json(card))
}

// ─── Downloads ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VcardParams {
  pub include_photo: Option<bool>,
}

/// `GET /cards/{shortcode}/vcard[?include_photo=<bool>]`
pub async fn vcard<S>(
  State(state): State<ApiState<S>>,
  Path(shortcode): Path<String>,
  Query(params): Query<VcardParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = find_card(state.store.as_ref(), &shortcode).await?;
  let options = SerializeOptions {
    include_photo: params.include_photo.unwrap_or(true),
    ..SerializeOptions::default()
  };
  let body = serialize(&card.record, &options);
  let disposition = attachment_disposition(&download_filename(&card.record));

  Ok((
    [
      (header::CONTENT_TYPE, CONTENT_TYPE.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    body,
  ))
}

#[derive(Debug, Deserialize)]
pub struct QrParams {
  #[serde(default)]
  pub encoding: QrFormat,
}

/// `GET /cards/{shortcode}/qr[?encoding=data_url|plain_text]`
pub async fn qr<S>(
  State(state): State<ApiState<S>>,
  Path(shortcode): Path<String>,
  Query(params): Query<QrParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = find_card(state.store.as_ref(), &shortcode).await?;
  qr_response(&card.record, params.encoding)
}
