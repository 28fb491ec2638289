//! Authentication and authorization configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// The signing secret is loaded once at startup and injected into the
/// token codec; it is never logged or echoed back.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret", skip_serializing)]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Path to the TOML file holding the default permission set.
    ///
    /// A missing or unparsable file is a fatal startup error.
    #[serde(default = "default_permissions_file")]
    pub default_permissions_file: String,
    /// Bounded timeout applied to every revocation-store, user, and role
    /// lookup on the authorization path. A timeout fails closed.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_seconds: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_hours", &self.refresh_ttl_hours)
            .field("default_permissions_file", &self.default_permissions_file)
            .field("lookup_timeout_seconds", &self.lookup_timeout_seconds)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            default_permissions_file: default_permissions_file(),
            lookup_timeout_seconds: default_lookup_timeout(),
        }
    }
}

impl AuthConfig {
    /// The lookup timeout as a `Duration`.
    pub fn lookup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.lookup_timeout_seconds)
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    24
}

fn default_permissions_file() -> String {
    "config/permissions.toml".to_string()
}

fn default_lookup_timeout() -> u64 {
    3
}
