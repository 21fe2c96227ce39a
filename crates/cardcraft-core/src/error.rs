//! Error types for `cardcraft-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("card not found: {0}")]
  CardNotFound(Uuid),

  #[error("invalid short code: {0:?}")]
  InvalidShortCode(String),

  #[error("could not allocate a unique short code after {0} attempts")]
  ShortCodeExhausted(u32),

  #[error("contact needs a first or last name")]
  NotNameable,

  #[error("unknown event kind: {0:?}")]
  UnknownEventKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
