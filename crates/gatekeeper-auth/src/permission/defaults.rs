//! Default permission set granted to every authenticated user.

use std::collections::HashSet;
use std::path::Path;

use config::{Config, File};
use tracing::info;

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;

/// Permissions every authenticated user holds regardless of role.
///
/// Loaded once at startup from a TOML file with a `default_permissions`
/// array. A missing or unparsable file is a fatal startup error, never
/// silently an empty set.
#[derive(Debug, Clone)]
pub struct DefaultPermissions {
    permissions: HashSet<String>,
}

impl DefaultPermissions {
    /// Load the default permission set from the given file.
    pub fn load(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            return Err(AppError::configuration(format!(
                "Default permissions file '{path}' not found"
            )));
        }

        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to read default permissions: {e}"))
            })?;

        let permissions: Vec<String> = settings.get("default_permissions").map_err(|e| {
            AppError::configuration(format!("Missing 'default_permissions' key in '{path}': {e}"))
        })?;

        info!(count = permissions.len(), "Loaded default permission set");
        Ok(Self {
            permissions: permissions.into_iter().collect(),
        })
    }

    /// Build a default permission set from an explicit list.
    pub fn from_list(permissions: impl IntoIterator<Item = String>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Iterate the default permissions.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.permissions.iter()
    }

    /// Check whether a permission is granted by default.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
