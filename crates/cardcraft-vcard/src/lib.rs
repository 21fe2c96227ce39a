//! vCard 3.0 writer for cardcraft.
//!
//! Turns a [`ContactRecord`] into the text a contact book imports, plus the
//! small helpers every consumer of that text needs: the download file name and
//! the QR-code payload. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```
//! use cardcraft_core::record::ContactRecord;
//! use cardcraft_vcard::{SerializeOptions, serialize};
//!
//! let record = ContactRecord {
//!   first_name: "Ada".into(),
//!   last_name:  "Lovelace".into(),
//!   ..Default::default()
//! };
//! let vcard = serialize(&record, &SerializeOptions::default());
//! assert!(vcard.contains("FN:Ada Lovelace\r\n"));
//! ```

mod photo;
mod serialize;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use cardcraft_core::record::ContactRecord;

pub use photo::PhotoDataUrl;
pub use serialize::{SerializeOptions, serialize};

/// Media type of the serialized text.
pub const MEDIA_TYPE: &str = "text/vcard";

/// `Content-Type` header value for a served card.
pub const CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

// ─── QR payloads ─────────────────────────────────────────────────────────────

/// How the card text is wrapped for a QR code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrEncoding {
  /// `data:text/vcard;base64,<...>`
  #[default]
  DataUrl,
  /// The vCard text as-is.
  PlainText,
}

/// Serialize `record` for QR embedding: identical to the full card minus the
/// `PHOTO` line.
pub fn serialize_for_qr(record: &ContactRecord) -> String {
  serialize(record, &SerializeOptions::qr())
}

/// The string to hand to a QR-code generator. Never contains photo data.
pub fn qr_payload(record: &ContactRecord, encoding: QrEncoding) -> String {
  let text = serialize_for_qr(record);
  match encoding {
    QrEncoding::DataUrl   => format!("data:{MEDIA_TYPE};base64,{}", B64.encode(text)),
    QrEncoding::PlainText => text,
  }
}

// ─── Download ────────────────────────────────────────────────────────────────

/// `<first>_<last>.vcf`, substituting `contact` / `card` for empty names.
pub fn download_filename(record: &ContactRecord) -> String {
  let first = if record.first_name.is_empty() { "contact" } else { record.first_name.as_str() };
  let last = if record.last_name.is_empty() { "card" } else { record.last_name.as_str() };
  format!("{first}_{last}.vcf")
}
