//! Stored cards: a contact record plus the identity the store assigns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{record::ContactRecord, shortcode::ShortCode};

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCard {
  pub card_id:    Uuid,
  pub shortcode:  ShortCode,
  /// Opaque id of the browser session that created the card, used to list
  /// "my cards" without an account.
  pub session_id: Option<String>,
  pub record:     ContactRecord,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl StoredCard {
  pub fn summary(&self) -> CardSummary {
    CardSummary {
      card_id:      self.card_id,
      shortcode:    self.shortcode.clone(),
      first_name:   self.record.first_name.clone(),
      last_name:    self.record.last_name.clone(),
      organization: self.record.organization.clone(),
      created_at:   self.created_at,
    }
  }
}

/// The lightweight listing form of a [`StoredCard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
  pub card_id:      Uuid,
  pub shortcode:    ShortCode,
  pub first_name:   String,
  pub last_name:    String,
  pub organization: String,
  pub created_at:   DateTime<Utc>,
}
