//! Persistence traits for the domain entities.
//!
//! The service and API layers depend on these traits rather than on a
//! concrete database, which keeps the token and permission logic
//! testable with in-memory implementations.

use async_trait::async_trait;
use gatekeeper_core::types::{PageRequest, PageResponse};
use gatekeeper_core::AppResult;
use uuid::Uuid;

use crate::role::{CreateRole, Role, UpdateRole};
use crate::user::{CreateUser, UpdateUser, User};

/// Store for [`User`] entities.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by id. Returns `None` when no such user exists.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email. Returns `None` when no such user exists.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users, paginated.
    async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<User>>;

    /// Create a new user. Fails with a conflict when the email is taken.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Update an existing user.
    async fn update(&self, id: Uuid, data: UpdateUser) -> AppResult<User>;

    /// Delete a user by id.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Add a role to a user's role set. Idempotent.
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<User>;

    /// Remove a role from a user's role set. Idempotent.
    async fn unassign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<User>;
}

/// Store for [`Role`] entities.
#[async_trait]
pub trait RoleStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a role by id. Returns `None` when no such role exists.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>>;

    /// Fetch all roles with the given ids. Missing ids are skipped.
    async fn find_many_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>>;

    /// List roles, paginated.
    async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Role>>;

    /// Create a new role. Fails with a conflict when the name is taken.
    async fn create(&self, data: CreateRole) -> AppResult<Role>;

    /// Update an existing role.
    async fn update(&self, id: Uuid, data: UpdateRole) -> AppResult<Role>;

    /// Delete a role by id.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
