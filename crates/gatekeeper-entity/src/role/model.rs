//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named set of permissions that can be assigned to users.
///
/// Permissions are `resource:action` strings, e.g. `users:read` or
/// `roles:assign`. The special permission `manage:system` grants
/// unrestricted access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name.
    pub name: String,
    /// Permission strings granted by this role.
    pub permissions: Vec<String>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Check whether this role grants the given permission.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Data required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    /// Role name, must be unique.
    pub name: String,
    /// Permission strings granted by the role.
    pub permissions: Vec<String>,
}

/// Fields that can be updated on a role. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRole {
    /// New role name.
    pub name: Option<String>,
    /// Replacement permission set.
    pub permissions: Option<Vec<String>>,
}
