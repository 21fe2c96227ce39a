//! Engagement events and the analytics derived from them.
//!
//! Events are append-only. Statistics are never stored; they are computed
//! from the event log on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// What a visitor did with a shared card.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
  PageView,
  SaveClick,
  Download,
  QrScan,
}

/// An event as submitted, before the store assigns it an id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub kind:       EventKind,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
  /// SHA-256 hex digest of the client address; the address itself is never
  /// stored.
  pub ip_hash:    Option<String>,
}

impl NewEvent {
  pub fn new(kind: EventKind) -> Self {
    Self { kind, user_agent: None, referrer: None, ip_hash: None }
  }
}

/// A recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEvent {
  pub event_id:   Uuid,
  pub card_id:    Uuid,
  pub kind:       EventKind,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
  pub ip_hash:    Option<String>,
  pub created_at: DateTime<Utc>,
}

impl CardEvent {
  pub fn platform(&self) -> Platform { Platform::from_user_agent(self.user_agent.as_deref()) }
}

/// Coarse visitor platform, sniffed from a `User-Agent` header for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum Platform {
  #[strum(serialize = "iOS")]
  Ios,
  Android,
  Windows,
  Mac,
  Other,
  Unknown,
}

impl Platform {
  /// Checked in order; iPad user agents also mention "Mac OS X".
  pub fn from_user_agent(user_agent: Option<&str>) -> Self {
    let Some(ua) = user_agent else {
      return Platform::Unknown;
    };
    let ua = ua.to_ascii_lowercase();
    if ["iphone", "ipad", "ipod"].iter().any(|p| ua.contains(p)) {
      Platform::Ios
    } else if ua.contains("android") {
      Platform::Android
    } else if ua.contains("windows") {
      Platform::Windows
    } else if ua.contains("mac") {
      Platform::Mac
    } else {
      Platform::Other
    }
  }
}

/// Aggregate counts for one card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
  pub page_views:      u64,
  pub save_clicks:     u64,
  pub downloads:       u64,
  pub qr_scans:        u64,
  /// Percentage of page views that led to a save, one decimal place.
  pub conversion_rate: f64,
}

impl CardStats {
  /// Build stats from per-kind counts, deriving the conversion rate.
  pub fn from_counts(page_views: u64, save_clicks: u64, downloads: u64, qr_scans: u64) -> Self {
    Self {
      page_views,
      save_clicks,
      downloads,
      qr_scans,
      conversion_rate: conversion_rate(page_views, save_clicks.max(downloads)),
    }
  }
}

/// `saves / views` as a percentage rounded to one decimal; zero with no views.
fn conversion_rate(views: u64, saves: u64) -> f64 {
  if views == 0 {
    return 0.0;
  }
  let pct = saves as f64 / views as f64 * 100.0;
  (pct * 10.0).round() / 10.0
}
