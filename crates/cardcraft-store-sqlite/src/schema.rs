//! SQL schema for the cardcraft SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cards (
    card_id     TEXT PRIMARY KEY,
    shortcode   TEXT NOT NULL UNIQUE,
    session_id  TEXT,
    record_json TEXT NOT NULL,   -- ContactRecord, camelCase JSON
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

-- Events are strictly append-only.
CREATE TABLE IF NOT EXISTS card_events (
    event_id    TEXT PRIMARY KEY,
    card_id     TEXT NOT NULL REFERENCES cards(card_id),
    event_type  TEXT NOT NULL,   -- 'page_view' | 'save_click' | 'download' | 'qr_scan'
    user_agent  TEXT,
    referrer    TEXT,
    ip_hash     TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS cards_session_idx ON cards(session_id);
CREATE INDEX IF NOT EXISTS events_card_idx   ON card_events(card_id, created_at);

PRAGMA user_version = 1;
";
