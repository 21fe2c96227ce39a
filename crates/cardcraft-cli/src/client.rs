//! Async HTTP client wrapping the cardcraft JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use cardcraft_core::{
  card::{CardSummary, StoredCard},
  event::{CardEvent, CardStats},
  record::ContactRecord,
};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

/// `POST /api/cards` response.
#[derive(Debug, Deserialize)]
pub struct Shared {
  pub card:      StoredCard,
  pub share_url: String,
}

impl Shared {
  /// One-line note naming the stored card, e.g. `shared Jane Doe as V1StGXR8`.
  pub fn note(&self) -> String {
    let name = format!("{} {}", self.card.record.first_name, self.card.record.last_name);
    format!("shared {} as {}", name.trim(), self.card.shortcode)
  }
}

/// `GET /api/cards/{shortcode}/analytics` response.
#[derive(Debug, Deserialize)]
pub struct Analytics {
  pub card:          CardSummary,
  pub stats:         CardStats,
  pub recent_events: Vec<CardEvent>,
}

/// Async HTTP client for the cardcraft JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `POST /api/cards`
  pub async fn share(&self, record: &ContactRecord, session_id: Option<&str>) -> Result<Shared> {
    let resp = self
      .client
      .post(self.url("/cards"))
      .json(&json!({ "record": record, "session_id": session_id }))
      .send()
      .await
      .context("POST /cards failed")?;

    let resp = check(resp, "POST /cards").await?;
    resp.json().await.context("deserialising shared card")
  }

  /// `GET /api/cards/{shortcode}/analytics`
  pub async fn analytics(&self, shortcode: &str) -> Result<Analytics> {
    let path = format!("/cards/{shortcode}/analytics");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    let resp = check(resp, &format!("GET {path}")).await?;
    resp.json().await.context("deserialising analytics")
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  tracing::debug!(%status, %message, "request rejected");
  Err(anyhow!("{what} → {status} {message}"))
}
