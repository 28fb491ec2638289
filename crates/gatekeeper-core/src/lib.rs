//! # gatekeeper-core
//!
//! Core crate for Gatekeeper. Contains configuration schemas, the unified
//! error system, collaborator capability traits, and pagination types.
//!
//! This crate has **no** internal dependencies on other Gatekeeper crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
