//! # gatekeeper-api
//!
//! HTTP API layer for Gatekeeper built on Axum: routes, handlers,
//! request/response DTOs, the authentication extractor, and error
//! mapping to HTTP responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
