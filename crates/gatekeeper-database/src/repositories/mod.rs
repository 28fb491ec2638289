//! Concrete store implementations backed by PostgreSQL.

pub mod role;
pub mod user;

pub use role::RoleRepository;
pub use user::UserRepository;
