//! Effective permission resolution and authorization checks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error};

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_entity::{RoleStore, User};

use super::defaults::DefaultPermissions;
use super::MANAGE_SYSTEM;

/// Uniform message for denied access checks.
const PERMISSION_DENIED: &str = "You do not have permission to perform this action";

/// Resolves a user's effective permission set and enforces access checks.
///
/// Role permissions are re-fetched on every check so that a role edit or
/// unassignment takes effect immediately, bounded only by in-flight
/// requests.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// Role store for permission lookups.
    roles: Arc<dyn RoleStore>,
    /// Permissions granted to every authenticated user.
    defaults: DefaultPermissions,
    /// Bounded time allowed for the role lookup.
    lookup_timeout: Duration,
}

impl PermissionResolver {
    /// Create a new permission resolver.
    pub fn new(
        roles: Arc<dyn RoleStore>,
        defaults: DefaultPermissions,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            roles,
            defaults,
            lookup_timeout,
        }
    }

    /// Compute the user's effective permission set: the default grants
    /// plus the union of all assigned role permissions. Roles that have
    /// been deleted since assignment contribute nothing.
    pub async fn resolve(&self, user: &User) -> AppResult<HashSet<String>> {
        let mut effective: HashSet<String> =
            self.defaults.iter().cloned().collect();

        if !user.role_ids.is_empty() {
            // An unreachable role store denies access rather than leaking
            // the outage class to the caller.
            let roles = match timeout(
                self.lookup_timeout,
                self.roles.find_many_by_ids(&user.role_ids),
            )
            .await
            {
                Ok(Ok(roles)) => roles,
                Ok(Err(e)) => {
                    error!(error = %e, user_id = %user.id, "Role lookup failed during authorization");
                    return Err(AppError::forbidden(PERMISSION_DENIED));
                }
                Err(_) => {
                    error!(user_id = %user.id, "Role lookup timed out during authorization");
                    return Err(AppError::forbidden(PERMISSION_DENIED));
                }
            };

            for role in roles {
                effective.extend(role.permissions);
            }
        }

        Ok(effective)
    }

    /// Check whether the user holds at least one of the required
    /// permissions. An empty requirement always passes; `manage:system`
    /// satisfies any requirement.
    pub async fn has_any(&self, user: &User, required: &[&str]) -> AppResult<bool> {
        if required.is_empty() {
            return Ok(true);
        }

        let effective = self.resolve(user).await?;

        if effective.contains(MANAGE_SYSTEM) {
            return Ok(true);
        }

        Ok(required.iter().any(|p| effective.contains(*p)))
    }

    /// Enforce that the user holds at least one of the required
    /// permissions, returning a forbidden error otherwise.
    pub async fn authorize(&self, user: &User, required: &[&str]) -> AppResult<()> {
        if self.has_any(user, required).await? {
            Ok(())
        } else {
            debug!(user_id = %user.id, ?required, "Permission denied");
            Err(AppError::forbidden(PERMISSION_DENIED))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use gatekeeper_core::types::{PageRequest, PageResponse};
    use gatekeeper_entity::role::{CreateRole, Role, UpdateRole};
    use std::collections::HashMap;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct FixedRoleStore {
        roles: HashMap<Uuid, Role>,
    }

    impl FixedRoleStore {
        fn with_role(mut self, role: Role) -> Self {
            self.roles.insert(role.id, role);
            self
        }
    }

    #[async_trait]
    impl RoleStore for FixedRoleStore {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
            Ok(self.roles.get(&id).cloned())
        }

        async fn find_many_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
            Ok(ids
                .iter()
                .filter_map(|id| self.roles.get(id).cloned())
                .collect())
        }

        async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Role>> {
            let roles: Vec<Role> = self.roles.values().cloned().collect();
            let total = roles.len() as u64;
            Ok(PageResponse::new(roles, page.page, page.page_size, total))
        }

        async fn create(&self, _data: CreateRole) -> AppResult<Role> {
            unimplemented!("not exercised")
        }

        async fn update(&self, _id: Uuid, _data: UpdateRole) -> AppResult<Role> {
            unimplemented!("not exercised")
        }

        async fn delete(&self, _id: Uuid) -> AppResult<()> {
            unimplemented!("not exercised")
        }
    }

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: format!("role-{}", Uuid::new_v4()),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(role_ids: Vec<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role_ids,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn resolver(store: FixedRoleStore, defaults: &[&str]) -> PermissionResolver {
        PermissionResolver::new(
            Arc::new(store),
            DefaultPermissions::from_list(defaults.iter().map(|p| p.to_string())),
            Duration::from_secs(3),
        )
    }

    #[tokio::test]
    async fn test_union_of_role_permissions() {
        let reader = role(&["users:read"]);
        let editor = role(&["users:update", "roles:read"]);
        let user = user(vec![reader.id, editor.id]);
        let resolver = resolver(
            FixedRoleStore::default().with_role(reader).with_role(editor),
            &[],
        );

        let effective = resolver.resolve(&user).await.unwrap();
        assert!(effective.contains("users:read"));
        assert!(effective.contains("users:update"));
        assert!(effective.contains("roles:read"));
        assert!(!effective.contains("users:delete"));
    }

    #[tokio::test]
    async fn test_defaults_granted_without_roles() {
        let user = user(vec![]);
        let resolver = resolver(FixedRoleStore::default(), &["users:read"]);

        assert!(resolver.has_any(&user, &["users:read"]).await.unwrap());
        assert!(!resolver.has_any(&user, &["users:delete"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_manage_system_grants_everything() {
        let admin = role(&[MANAGE_SYSTEM]);
        let user = user(vec![admin.id]);
        let resolver = resolver(FixedRoleStore::default().with_role(admin), &[]);

        assert!(resolver.has_any(&user, &["users:delete"]).await.unwrap());
        assert!(resolver.has_any(&user, &["anything:at-all"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_requirement_passes() {
        let user = user(vec![]);
        let resolver = resolver(FixedRoleStore::default(), &[]);

        assert!(resolver.has_any(&user, &[]).await.unwrap());
        resolver.authorize(&user, &[]).await.unwrap();
    }

    #[derive(Debug)]
    struct OfflineRoleStore;

    #[async_trait]
    impl RoleStore for OfflineRoleStore {
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Role>> {
            Err(AppError::database("role store offline"))
        }

        async fn find_many_by_ids(&self, _ids: &[Uuid]) -> AppResult<Vec<Role>> {
            Err(AppError::database("role store offline"))
        }

        async fn find_all(&self, _page: PageRequest) -> AppResult<PageResponse<Role>> {
            Err(AppError::database("role store offline"))
        }

        async fn create(&self, _data: CreateRole) -> AppResult<Role> {
            Err(AppError::database("role store offline"))
        }

        async fn update(&self, _id: Uuid, _data: UpdateRole) -> AppResult<Role> {
            Err(AppError::database("role store offline"))
        }

        async fn delete(&self, _id: Uuid) -> AppResult<()> {
            Err(AppError::database("role store offline"))
        }
    }

    #[tokio::test]
    async fn test_role_store_outage_denies_as_forbidden() {
        let user = user(vec![Uuid::new_v4()]);
        let resolver = PermissionResolver::new(
            Arc::new(OfflineRoleStore),
            DefaultPermissions::from_list(vec![]),
            Duration::from_secs(3),
        );

        let err = resolver.authorize(&user, &["users:read"]).await.unwrap_err();
        assert_eq!(err.kind, gatekeeper_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_deleted_role_contributes_nothing() {
        // The user still references a role id that no longer exists.
        let user = user(vec![Uuid::new_v4()]);
        let resolver = resolver(FixedRoleStore::default(), &[]);

        let err = resolver.authorize(&user, &["users:read"]).await.unwrap_err();
        assert_eq!(err.kind, gatekeeper_core::error::ErrorKind::Forbidden);
    }
}
