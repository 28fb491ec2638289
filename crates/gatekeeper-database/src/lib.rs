//! # gatekeeper-database
//!
//! PostgreSQL connection management and concrete store implementations
//! for the Gatekeeper entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
