//! ETag computation and client fingerprinting for the public share route.
//!
//! The ETag is a SHA-256 hash over the exact bytes served, so any edit to the
//! stored record (or to the serializer) invalidates cached copies.

use sha2::{Digest, Sha256};

/// Compute a strong, quoted ETag for `body`.
pub fn compute_etag(body: &str) -> String {
  let hash = Sha256::digest(body.as_bytes());
  format!("\"{}\"", hex::encode(hash))
}

/// Strip surrounding quotes and a weak `W/` prefix from an ETag.
pub fn strip_etag_quotes(s: &str) -> &str {
  let s = s.trim();
  let s = s.strip_prefix("W/").unwrap_or(s);
  s.trim_matches('"')
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Handles `*` and comma-separated lists.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let current = strip_etag_quotes(etag);
  header
    .split(',')
    .map(str::trim)
    .any(|candidate| candidate == "*" || strip_etag_quotes(candidate) == current)
}

/// SHA-256 hex digest of a client address. Only the digest is stored.
pub fn hash_ip(ip: &str) -> String { hex::encode(Sha256::digest(ip.as_bytes())) }
