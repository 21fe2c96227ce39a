//! The public share link: `GET /c/{shortcode}[.vcf][?src=qr]`.
//!
//! Serves the full card (photo included) as a download and logs the visit.
//! A matching `If-None-Match` short-circuits to `304` without logging.

use std::net::SocketAddr;

use axum::{
  extract::{ConnectInfo, Path, Query, Request, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use cardcraft_api::attachment_disposition;
use cardcraft_core::{
  event::{EventKind, NewEvent},
  shortcode::ShortCode,
  store::CardStore,
};
use cardcraft_vcard::{CONTENT_TYPE, SerializeOptions, download_filename, serialize};
use serde::Deserialize;

use crate::{
  AppState,
  error::Error,
  etag::{compute_etag, hash_ip, if_none_match},
};

#[derive(Debug, Deserialize)]
pub struct ShareParams {
  /// `qr` when the link was opened from a scanned code.
  pub src: Option<String>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Path(segment): Path<String>,
  Query(params): Query<ShareParams>,
  req: Request,
) -> Result<Response, Error>
where
  S: CardStore + Clone + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let code = ShortCode::parse(segment.strip_suffix(".vcf").unwrap_or(&segment))?;

  let card = state
    .store
    .get_card_by_shortcode(&code)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound)?;

  let body = serialize(&card.record, &SerializeOptions::default());
  let etag = compute_etag(&body);

  let headers = req.headers();
  if let Some(inm) = headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok())
    && if_none_match(inm, &etag)
  {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let mut kinds = Vec::with_capacity(3);
  if params.src.as_deref() == Some("qr") {
    kinds.push(EventKind::QrScan);
  }
  kinds.extend([EventKind::SaveClick, EventKind::Download]);

  let visit = visitor(headers, &req);
  for kind in kinds {
    let event = NewEvent { kind, ..visit.clone() };
    if let Err(e) = state.store.record_event(card.card_id, event).await {
      tracing::warn!(shortcode = %code, %kind, error = %e, "failed to record event");
    }
  }

  let disposition = attachment_disposition(&download_filename(&card.record));
  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, CONTENT_TYPE.to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
        (header::ETAG, etag),
      ],
      body,
    )
      .into_response(),
  )
}

/// Request metadata attached to every event logged for this visit.
fn visitor(headers: &HeaderMap, req: &Request) -> NewEvent {
  let header_str = |name| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
  };

  // Behind a proxy the first forwarded hop is the client.
  let forwarded = header_str(header::HeaderName::from_static("x-forwarded-for"))
    .and_then(|v| v.split(',').next().map(|s| s.trim().to_owned()))
    .filter(|s| !s.is_empty());
  let peer = req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string());

  NewEvent {
    kind:       EventKind::PageView,
    user_agent: header_str(header::USER_AGENT),
    referrer:   header_str(header::REFERER),
    ip_hash:    forwarded.or(peer).as_deref().map(hash_ip),
  }
}
