//! Extraction of embedded photos from `data:` URLs.

use std::sync::LazyLock;

use regex::Regex;

/// `data:image/<subtype>;base64,<payload>`. The subtype is ASCII word
/// characters; the payload runs to the end of the input and may not contain
/// line terminators.
static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^data:image/([A-Za-z0-9_]+);base64,([^\r\n\x{2028}\x{2029}]+)$")
    .expect("data URL pattern is valid")
});

/// A photo carried inline as a base64 data URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoDataUrl<'a> {
  subtype: &'a str,
  payload: &'a str,
}

impl<'a> PhotoDataUrl<'a> {
  /// Split `url` into image subtype and base64 payload.
  ///
  /// Anything that does not match the pattern yields `None`; a malformed
  /// photo is treated the same as no photo.
  pub fn parse(url: &'a str) -> Option<Self> {
    let caps = DATA_URL.captures(url)?;
    Some(Self {
      subtype: caps.get(1)?.as_str(),
      payload: caps.get(2)?.as_str(),
    })
  }

  /// Image subtype as written, e.g. `jpeg`.
  pub fn subtype(&self) -> &'a str { self.subtype }

  /// The base64 text, untouched.
  pub fn payload(&self) -> &'a str { self.payload }

  /// The vCard `TYPE` parameter value, e.g. `JPEG`.
  pub fn vcard_type(&self) -> String { self.subtype.to_uppercase() }
}
