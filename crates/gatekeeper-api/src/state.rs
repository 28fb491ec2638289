//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatekeeper_auth::{PasswordHasher, PermissionResolver, TokenService};
use gatekeeper_cache::CacheManager;
use gatekeeper_core::config::AppConfig;
use gatekeeper_entity::{RoleStore, UserStore};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks. The
/// stores are trait objects so tests can swap in in-memory fakes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory), backing the revocation list.
    pub cache: Arc<CacheManager>,
    /// Token lifecycle service: login, refresh, logout.
    pub tokens: Arc<TokenService>,
    /// RBAC permission resolver.
    pub permissions: Arc<PermissionResolver>,
    /// Password hasher (Argon2).
    pub password_hasher: Arc<PasswordHasher>,
    /// User store.
    pub users: Arc<dyn UserStore>,
    /// Role store.
    pub roles: Arc<dyn RoleStore>,
}
