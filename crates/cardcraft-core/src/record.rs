//! The contact record: the form state a vCard is rendered from.
//!
//! Every field is independently optional. Text fields use the empty string for
//! "absent"; only the photo is an `Option`, since its absence and an empty
//! data URL mean the same thing to every consumer.

use serde::{Deserialize, Serialize};

/// A business contact as entered in the form.
///
/// The record carries no identity of its own. Short codes and database ids
/// are assigned when a record is stored (see [`crate::card::StoredCard`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactRecord {
  /// `data:image/<subtype>;base64,<payload>`, already resized by the caller.
  pub photo:           Option<String>,
  pub first_name:      String,
  pub last_name:       String,
  pub title:           String,
  pub organization:    String,
  pub phone_mobile:    String,
  pub phone_work:      String,
  pub phone_fax:       String,
  pub email_primary:   String,
  pub email_secondary: String,
  pub website:         String,
  pub linkedin:        String,
  pub twitter:         String,
  pub address_street:  String,
  pub address_city:    String,
  pub address_state:   String,
  pub address_zip:     String,
  pub address_country: String,
}

impl ContactRecord {
  /// Whether at least one of first or last name is non-empty.
  pub fn is_nameable(&self) -> bool {
    !self.first_name.is_empty() || !self.last_name.is_empty()
  }

  /// Whether any of the five address components is non-empty.
  pub fn has_address(&self) -> bool {
    [
      &self.address_street,
      &self.address_city,
      &self.address_state,
      &self.address_zip,
      &self.address_country,
    ]
    .iter()
    .any(|c| !c.is_empty())
  }

  /// The photo data URL, treating an empty string as absent.
  pub fn photo(&self) -> Option<&str> {
    self.photo.as_deref().filter(|p| !p.is_empty())
  }
}
