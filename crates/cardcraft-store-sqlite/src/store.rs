//! [`SqliteStore`] — the SQLite implementation of [`CardStore`].

use std::path::Path;

use cardcraft_core::{
  card::{CardSummary, StoredCard},
  event::{CardEvent, CardStats, EventKind, NewEvent},
  record::ContactRecord,
  shortcode::ShortCode,
  store::{CardStore, SHORT_CODE_ATTEMPTS},
};
use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawCard, RawEvent, decode_event_kind, encode_dt, encode_event_kind, encode_record,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Timestamps are stored at microsecond precision; truncate up front so the
/// value handed back equals the value read back later.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A card store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn card_exists(&self, card_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(card_id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM cards WHERE card_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn ensure_card(&self, card_id: Uuid) -> Result<()> {
    if self.card_exists(card_id).await? {
      Ok(())
    } else {
      Err(Error::CardNotFound(card_id))
    }
  }

  /// Insert `card` unless its short code is taken. Returns whether a row was
  /// written.
  async fn try_insert_card(&self, card: &StoredCard) -> Result<bool> {
    let card_id_str    = encode_uuid(card.card_id);
    let shortcode      = card.shortcode.to_string();
    let session_id     = card.session_id.clone();
    let record_json    = encode_record(&card.record)?;
    let created_at_str = encode_dt(card.created_at);
    let updated_at_str = encode_dt(card.updated_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO cards (
             card_id, shortcode, session_id, record_json, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            card_id_str,
            shortcode,
            session_id,
            record_json,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(n == 1)
      })
      .await?;
    Ok(inserted)
  }

  /// Insert a new card, drawing short codes from `next_code` until one is
  /// free or [`SHORT_CODE_ATTEMPTS`] have collided.
  pub(crate) async fn insert_with_fresh_code(
    &self,
    record:     ContactRecord,
    session_id: Option<String>,
    mut next_code: impl FnMut() -> ShortCode,
  ) -> Result<StoredCard> {
    let at = now();
    let mut card = StoredCard {
      card_id:    Uuid::new_v4(),
      shortcode:  next_code(),
      session_id,
      record,
      created_at: at,
      updated_at: at,
    };

    for attempt in 1..=SHORT_CODE_ATTEMPTS {
      if attempt > 1 {
        card.shortcode = next_code();
      }
      if self.try_insert_card(&card).await? {
        tracing::debug!(card_id = %card.card_id, shortcode = %card.shortcode, "card created");
        return Ok(card);
      }
      tracing::debug!(shortcode = %card.shortcode, attempt, "short code collision");
    }

    Err(cardcraft_core::Error::ShortCodeExhausted(SHORT_CODE_ATTEMPTS).into())
  }
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = Error;

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn create_card(
    &self,
    record:     ContactRecord,
    session_id: Option<String>,
  ) -> Result<StoredCard> {
    self
      .insert_with_fresh_code(record, session_id, ShortCode::generate)
      .await
  }

  async fn get_card(&self, card_id: Uuid) -> Result<Option<StoredCard>> {
    let id_str = encode_uuid(card_id);

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM cards WHERE card_id = ?1", RawCard::COLUMNS),
              rusqlite::params![id_str],
              RawCard::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn get_card_by_shortcode(&self, shortcode: &ShortCode) -> Result<Option<StoredCard>> {
    let code = shortcode.to_string();

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM cards WHERE shortcode = ?1", RawCard::COLUMNS),
              rusqlite::params![code],
              RawCard::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn list_cards(&self, session_id: &str) -> Result<Vec<CardSummary>> {
    let session = session_id.to_owned();

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM cards WHERE session_id = ?1
           ORDER BY created_at DESC, rowid DESC",
          RawCard::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![session], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_summary).collect()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn record_event(&self, card_id: Uuid, input: NewEvent) -> Result<CardEvent> {
    self.ensure_card(card_id).await?;

    let event = CardEvent {
      event_id:   Uuid::new_v4(),
      card_id,
      kind:       input.kind,
      user_agent: input.user_agent,
      referrer:   input.referrer,
      ip_hash:    input.ip_hash,
      created_at: now(),
    };

    let event_id_str = encode_uuid(event.event_id);
    let card_id_str  = encode_uuid(card_id);
    let kind_str     = encode_event_kind(event.kind);
    let user_agent   = event.user_agent.clone();
    let referrer     = event.referrer.clone();
    let ip_hash      = event.ip_hash.clone();
    let at_str       = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO card_events (
             event_id, card_id, event_type, user_agent, referrer, ip_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            event_id_str,
            card_id_str,
            kind_str,
            user_agent,
            referrer,
            ip_hash,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%card_id, kind = %event.kind, "event recorded");
    Ok(event)
  }

  async fn stats(&self, card_id: Uuid) -> Result<CardStats> {
    self.ensure_card(card_id).await?;
    let id_str = encode_uuid(card_id);

    let counts: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_type, COUNT(*) FROM card_events
           WHERE card_id = ?1
           GROUP BY event_type",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let (mut views, mut saves, mut downloads, mut scans) = (0u64, 0u64, 0u64, 0u64);
    for (kind_str, n) in counts {
      let n = u64::try_from(n).unwrap_or_default();
      match decode_event_kind(&kind_str)? {
        EventKind::PageView  => views = n,
        EventKind::SaveClick => saves = n,
        EventKind::Download  => downloads = n,
        EventKind::QrScan    => scans = n,
      }
    }

    Ok(CardStats::from_counts(views, saves, downloads, scans))
  }

  async fn recent_events(&self, card_id: Uuid, limit: usize) -> Result<Vec<CardEvent>> {
    self.ensure_card(card_id).await?;
    let id_str    = encode_uuid(card_id);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM card_events WHERE card_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2",
          RawEvent::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
