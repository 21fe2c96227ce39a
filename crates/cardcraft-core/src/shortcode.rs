//! Short codes: the compact identifiers used in shareable links.

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// URL-safe alphabet; exactly 64 symbols so a byte masked with `0x3f` maps
/// onto it uniformly.
const ALPHABET: &[u8; 64] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of freshly generated codes.
pub const SHORT_CODE_LEN: usize = 8;

/// Longest code accepted by [`ShortCode::parse`].
const MAX_LEN: usize = 64;

/// A short, URL-safe identifier for a stored card, e.g. `V1StGXR8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
  /// Generate a random code of [`SHORT_CODE_LEN`] characters from the OS RNG.
  pub fn generate() -> Self {
    let mut bytes = [0u8; SHORT_CODE_LEN];
    OsRng.fill_bytes(&mut bytes);
    let code = bytes
      .iter()
      .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
      .collect();
    Self(code)
  }

  /// Validate `s` as a short code.
  pub fn parse(s: &str) -> Result<Self> {
    let valid = !s.is_empty()
      && s.len() <= MAX_LEN
      && s.bytes().all(|b| ALPHABET.contains(&b));
    if valid {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidShortCode(s.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ShortCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for ShortCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for ShortCode {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<ShortCode> for String {
  fn from(code: ShortCode) -> Self { code.0 }
}
