//! Refresh token revocation list backed by the cache provider.
//!
//! Tokens are keyed by a SHA-256 fingerprint of the raw token string, so
//! the revocation list never stores a usable credential. Entries carry a
//! TTL equal to the token's remaining validity; once the token would have
//! expired anyway the entry is allowed to lapse.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::time::timeout;

use gatekeeper_cache::keys;
use gatekeeper_cache::CacheManager;
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::CacheProvider;

use crate::token::Claims;

/// Floor for revocation entry TTLs, covering clock skew near expiry.
const MIN_REVOCATION_TTL: Duration = Duration::from_secs(60);

/// Marks refresh tokens as revoked and answers revocation queries.
#[derive(Debug, Clone)]
pub struct RevocationStore {
    /// Cache backend holding the revocation entries.
    cache: Arc<CacheManager>,
    /// Bounded time allowed for each cache round trip.
    lookup_timeout: Duration,
}

impl RevocationStore {
    /// Create a new revocation store.
    pub fn new(cache: Arc<CacheManager>, lookup_timeout: Duration) -> Self {
        Self {
            cache,
            lookup_timeout,
        }
    }

    /// Revoke a refresh token. Idempotent: revoking an already revoked
    /// token refreshes its entry and succeeds.
    pub async fn revoke(&self, token: &str, claims: &Claims) -> AppResult<()> {
        let key = keys::revoked_token(&fingerprint(token));
        let ttl = Duration::from_secs(claims.remaining_ttl_seconds()).max(MIN_REVOCATION_TTL);

        timeout(self.lookup_timeout, self.cache.set(&key, "revoked", ttl))
            .await
            .map_err(|_| AppError::service_unavailable("Revocation store timed out"))?
    }

    /// Check whether a refresh token has been revoked.
    ///
    /// A backend error or timeout is returned to the caller rather than
    /// treated as "not revoked"; callers fail closed on it.
    pub async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let key = keys::revoked_token(&fingerprint(token));

        let entry = timeout(self.lookup_timeout, self.cache.get(&key))
            .await
            .map_err(|_| AppError::service_unavailable("Revocation store timed out"))??;

        Ok(entry.is_some())
    }
}

/// Lowercase hex SHA-256 fingerprint of a raw token string.
fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
