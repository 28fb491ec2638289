//! Domain entity models for Gatekeeper.
//!
//! Plain data types shared across the service layers, plus the store
//! traits that persistence backends implement for them.

pub mod role;
pub mod store;
pub mod user;

pub use role::{CreateRole, Role, UpdateRole};
pub use store::{RoleStore, UserStore};
pub use user::{CreateUser, UpdateUser, User};
