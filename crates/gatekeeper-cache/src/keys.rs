//! Cache key builders for all Gatekeeper cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all Gatekeeper cache keys.
const PREFIX: &str = "gatekeeper";

/// Cache key for a revoked refresh token, by token fingerprint.
pub fn revoked_token(fingerprint: &str) -> String {
    format!("{PREFIX}:token:revoked:{fingerprint}")
}
