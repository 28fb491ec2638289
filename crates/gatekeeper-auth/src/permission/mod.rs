//! RBAC permission resolution.

mod defaults;
mod resolver;

pub use defaults::DefaultPermissions;
pub use resolver::PermissionResolver;

/// Permission that grants unrestricted access to every operation.
pub const MANAGE_SYSTEM: &str = "manage:system";
