//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use cardcraft_core::{
  event::{EventKind, NewEvent},
  record::ContactRecord,
  shortcode::ShortCode,
  store::CardStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(first: &str, last: &str) -> ContactRecord {
  ContactRecord {
    first_name:   first.into(),
    last_name:    last.into(),
    organization: "Acme".into(),
    photo:        Some("data:image/png;base64,AAAA".into()),
    ..Default::default()
  }
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_card() {
  let s = store().await;

  let card = s.create_card(record("Ada", "Lovelace"), None).await.unwrap();
  assert_eq!(card.shortcode.as_str().len(), 8);
  assert_eq!(card.created_at, card.updated_at);

  let fetched = s.get_card(card.card_id).await.unwrap().expect("card");
  assert_eq!(fetched, card);
}

#[tokio::test]
async fn get_card_by_shortcode_round_trips_record() {
  let s = store().await;
  let card = s.create_card(record("Ada", "Lovelace"), None).await.unwrap();

  let fetched = s.get_card_by_shortcode(&card.shortcode).await.unwrap().expect("card");
  assert_eq!(fetched.card_id, card.card_id);
  assert_eq!(fetched.record, record("Ada", "Lovelace"));
}

#[tokio::test]
async fn missing_card_returns_none() {
  let s = store().await;
  assert!(s.get_card(Uuid::new_v4()).await.unwrap().is_none());
  let code = ShortCode::parse("nope1234").unwrap();
  assert!(s.get_card_by_shortcode(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn shortcodes_are_unique() {
  let s = store().await;
  let mut seen = HashSet::new();
  for i in 0..50 {
    let card = s.create_card(record(&format!("n{i}"), ""), None).await.unwrap();
    assert!(seen.insert(card.shortcode.clone()), "duplicate {}", card.shortcode);
  }
}

#[tokio::test]
async fn collision_retries_until_free_code() {
  let s = store().await;
  let taken = ShortCode::parse("AAAAAAAA").unwrap();
  s.insert_with_fresh_code(record("Ada", ""), None, || taken.clone()).await.unwrap();

  let mut codes = vec![taken.clone(), taken.clone(), ShortCode::parse("BBBBBBBB").unwrap()].into_iter();
  let card = s
    .insert_with_fresh_code(record("Bob", ""), None, || codes.next().unwrap())
    .await
    .unwrap();
  assert_eq!(card.shortcode.as_str(), "BBBBBBBB");
}

#[tokio::test]
async fn exhausted_short_codes_surface_core_error() {
  let s = store().await;
  let taken = ShortCode::parse("AAAAAAAA").unwrap();
  s.insert_with_fresh_code(record("Ada", ""), Some("s".into()), || taken.clone()).await.unwrap();

  let mut calls = 0;
  let err = s
    .insert_with_fresh_code(record("Bob", ""), Some("s".into()), || {
      calls += 1;
      taken.clone()
    })
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(cardcraft_core::Error::ShortCodeExhausted(8))),
    "got {err:?}"
  );
  assert_eq!(calls, 8);
  assert_eq!(s.list_cards("s").await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_cards_filters_by_session_newest_first() {
  let s = store().await;
  let a = s.create_card(record("A", "One"), Some("sess-1".into())).await.unwrap();
  s.create_card(record("B", "Two"), Some("sess-2".into())).await.unwrap();
  let c = s.create_card(record("C", "Three"), Some("sess-1".into())).await.unwrap();
  s.create_card(record("D", "Four"), None).await.unwrap();

  let mine = s.list_cards("sess-1").await.unwrap();
  let ids: Vec<Uuid> = mine.iter().map(|c| c.card_id).collect();
  assert_eq!(ids, vec![c.card_id, a.card_id]);
  assert_eq!(mine[0].first_name, "C");
  assert_eq!(mine[0].organization, "Acme");

  assert!(s.list_cards("nobody").await.unwrap().is_empty());
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_for_unknown_card_fails() {
  let s = store().await;
  let err = s
    .record_event(Uuid::new_v4(), NewEvent::new(EventKind::PageView))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CardNotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn record_event_keeps_metadata() {
  let s = store().await;
  let card = s.create_card(record("Ada", ""), None).await.unwrap();

  let event = s
    .record_event(card.card_id, NewEvent {
      kind:       EventKind::SaveClick,
      user_agent: Some("curl/8".into()),
      referrer:   Some("https://example.test".into()),
      ip_hash:    Some("abc123".into()),
    })
    .await
    .unwrap();

  let recent = s.recent_events(card.card_id, 10).await.unwrap();
  assert_eq!(recent, vec![event]);
  assert_eq!(recent[0].user_agent.as_deref(), Some("curl/8"));
}

#[tokio::test]
async fn stats_count_each_kind() {
  let s = store().await;
  let card = s.create_card(record("Ada", ""), None).await.unwrap();

  for kind in [
    EventKind::PageView,
    EventKind::PageView,
    EventKind::PageView,
    EventKind::PageView,
    EventKind::SaveClick,
    EventKind::Download,
    EventKind::QrScan,
  ] {
    s.record_event(card.card_id, NewEvent::new(kind)).await.unwrap();
  }

  let stats = s.stats(card.card_id).await.unwrap();
  assert_eq!(stats.page_views, 4);
  assert_eq!(stats.save_clicks, 1);
  assert_eq!(stats.downloads, 1);
  assert_eq!(stats.qr_scans, 1);
  assert_eq!(stats.conversion_rate, 25.0);
}

#[tokio::test]
async fn stats_for_fresh_card_are_zero() {
  let s = store().await;
  let card = s.create_card(record("Ada", ""), None).await.unwrap();
  let stats = s.stats(card.card_id).await.unwrap();
  assert_eq!(stats.page_views, 0);
  assert_eq!(stats.conversion_rate, 0.0);
}

#[tokio::test]
async fn events_are_scoped_to_their_card() {
  let s = store().await;
  let a = s.create_card(record("A", ""), None).await.unwrap();
  let b = s.create_card(record("B", ""), None).await.unwrap();

  s.record_event(a.card_id, NewEvent::new(EventKind::PageView)).await.unwrap();

  assert_eq!(s.stats(b.card_id).await.unwrap().page_views, 0);
  assert!(s.recent_events(b.card_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn recent_events_newest_first_and_limited() {
  let s = store().await;
  let card = s.create_card(record("Ada", ""), None).await.unwrap();

  let mut ids = Vec::new();
  for _ in 0..12 {
    let e = s
      .record_event(card.card_id, NewEvent::new(EventKind::PageView))
      .await
      .unwrap();
    ids.push(e.event_id);
  }

  let recent = s.recent_events(card.card_id, 10).await.unwrap();
  assert_eq!(recent.len(), 10);
  let got: Vec<Uuid> = recent.iter().map(|e| e.event_id).collect();
  let expected: Vec<Uuid> = ids.iter().rev().take(10).copied().collect();
  assert_eq!(got, expected);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_file_store_keeps_cards() {
  let dir = std::env::temp_dir().join(format!("cardcraft-test-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("cards.db");

  let card = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_card(record("Ada", "Lovelace"), None).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get_card_by_shortcode(&card.shortcode).await.unwrap();
  assert_eq!(fetched.map(|c| c.card_id), Some(card.card_id));

  drop(s);
  std::fs::remove_dir_all(&dir).ok();
}
