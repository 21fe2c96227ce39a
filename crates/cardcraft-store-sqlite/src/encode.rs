//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological. The contact record is stored as
//! JSON. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use cardcraft_core::{
  card::{CardSummary, StoredCard},
  event::{CardEvent, EventKind},
  record::ContactRecord,
  shortcode::ShortCode,
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── EventKind ───────────────────────────────────────────────────────────────

/// Same spelling as the JSON wire form.
pub fn encode_event_kind(k: EventKind) -> String { k.as_ref().to_owned() }

pub fn decode_event_kind(s: &str) -> Result<EventKind> {
  EventKind::from_str(s)
    .map_err(|_| cardcraft_core::Error::UnknownEventKind(s.to_owned()).into())
}

// ─── ContactRecord ───────────────────────────────────────────────────────────

pub fn encode_record(r: &ContactRecord) -> Result<String> {
  Ok(serde_json::to_string(r)?)
}

pub fn decode_record(s: &str) -> Result<ContactRecord> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `cards` row.
pub struct RawCard {
  pub card_id:     String,
  pub shortcode:   String,
  pub session_id:  Option<String>,
  pub record_json: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawCard {
  pub const COLUMNS: &'static str =
    "card_id, shortcode, session_id, record_json, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      card_id:     row.get(0)?,
      shortcode:   row.get(1)?,
      session_id:  row.get(2)?,
      record_json: row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_card(self) -> Result<StoredCard> {
    Ok(StoredCard {
      card_id:    decode_uuid(&self.card_id)?,
      shortcode:  ShortCode::parse(&self.shortcode)?,
      session_id: self.session_id,
      record:     decode_record(&self.record_json)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }

  pub fn into_summary(self) -> Result<CardSummary> {
    Ok(self.into_card()?.summary())
  }
}

/// Raw strings read directly from a `card_events` row.
pub struct RawEvent {
  pub event_id:   String,
  pub card_id:    String,
  pub event_type: String,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
  pub ip_hash:    Option<String>,
  pub created_at: String,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "event_id, card_id, event_type, user_agent, referrer, ip_hash, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      card_id:    row.get(1)?,
      event_type: row.get(2)?,
      user_agent: row.get(3)?,
      referrer:   row.get(4)?,
      ip_hash:    row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<CardEvent> {
    Ok(CardEvent {
      event_id:   decode_uuid(&self.event_id)?,
      card_id:    decode_uuid(&self.card_id)?,
      kind:       decode_event_kind(&self.event_type)?,
      user_agent: self.user_agent,
      referrer:   self.referrer,
      ip_hash:    self.ip_hash,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
