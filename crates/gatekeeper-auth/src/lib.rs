//! # gatekeeper-auth
//!
//! Authentication and authorization primitives for Gatekeeper:
//!
//! - **token**: JWT access/refresh token encoding and verification
//! - **revocation**: refresh token revocation list backed by the cache
//! - **service**: the token lifecycle service (login, refresh, logout)
//! - **password**: Argon2id password hashing
//! - **permission**: RBAC permission resolution with default grants

pub mod password;
pub mod permission;
pub mod revocation;
pub mod service;
pub mod token;

pub use password::PasswordHasher;
pub use permission::{DefaultPermissions, PermissionResolver, MANAGE_SYSTEM};
pub use revocation::RevocationStore;
pub use service::TokenService;
pub use token::{Claims, TokenCodec, TokenError, TokenPair, TokenType};
