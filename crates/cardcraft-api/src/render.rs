//! Stateless rendering endpoints: the live preview and the QR payload.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/render` | Body: [`RenderBody`]; returns `text/vcard` |
//! | `POST` | `/qr` | Body: [`QrBody`]; returns `text/plain` |

use axum::{
  Json,
  http::header,
  response::IntoResponse,
};
use cardcraft_core::{Error, record::ContactRecord};
use cardcraft_vcard::{CONTENT_TYPE, QrEncoding, SerializeOptions, qr_payload, serialize};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Render ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /render`. Omitted flags take the serializer
/// defaults.
#[derive(Debug, Deserialize)]
pub struct RenderBody {
  pub record:        ContactRecord,
  pub include_photo: Option<bool>,
  pub escape_text:   Option<bool>,
  pub fold_lines:    Option<bool>,
}

impl RenderBody {
  fn options(&self) -> SerializeOptions {
    let defaults = SerializeOptions::default();
    SerializeOptions {
      include_photo: self.include_photo.unwrap_or(defaults.include_photo),
      escape_text:   self.escape_text.unwrap_or(defaults.escape_text),
      fold_lines:    self.fold_lines.unwrap_or(defaults.fold_lines),
    }
  }
}

/// `POST /render` — the vCard text for an unsaved record.
pub async fn render(Json(body): Json<RenderBody>) -> impl IntoResponse {
  let vcard = serialize(&body.record, &body.options());
  ([(header::CONTENT_TYPE, CONTENT_TYPE)], vcard)
}

// ─── QR ───────────────────────────────────────────────────────────────────────

/// Wire form of [`QrEncoding`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrFormat {
  #[default]
  DataUrl,
  PlainText,
}

impl From<QrFormat> for QrEncoding {
  fn from(f: QrFormat) -> Self {
    match f {
      QrFormat::DataUrl   => QrEncoding::DataUrl,
      QrFormat::PlainText => QrEncoding::PlainText,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct QrBody {
  pub record:   ContactRecord,
  #[serde(default)]
  pub encoding: QrFormat,
}

/// The QR payload for `record`, refusing records with no name.
pub(crate) fn qr_response(
  record: &ContactRecord,
  format: QrFormat,
) -> Result<impl IntoResponse + use<>, ApiError> {
  if !record.is_nameable() {
    return Err(Error::NotNameable.into());
  }
  let payload = qr_payload(record, format.into());
  Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], payload))
}

/// `POST /qr`
pub async fn qr(Json(body): Json<QrBody>) -> Result<impl IntoResponse, ApiError> {
  qr_response(&body.record, body.encoding)
}
