//! Role store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatekeeper_core::error::{AppError, ErrorKind};
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{PageRequest, PageResponse};
use gatekeeper_entity::role::{CreateRole, Role, UpdateRole};
use gatekeeper_entity::RoleStore;

/// PostgreSQL-backed store for role CRUD operations.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by id", e))
    }

    async fn find_many_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch roles", e))
    }

    async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Role>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count roles", e))?;

        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        Ok(PageResponse::new(
            roles,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn create(&self, data: CreateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, permissions) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("roles_name_key") => {
                AppError::conflict(format!("Role '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create role", e),
        })
    }

    async fn update(&self, id: Uuid, data: UpdateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = COALESCE($2, name), \
                              permissions = COALESCE($3, permissions), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.permissions)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("roles_name_key") => {
                AppError::conflict("Role name already exists".to_string())
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update role", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to start transaction", e)
        })?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        // Drop the role from every user that still references it.
        sqlx::query(
            "UPDATE users SET role_ids = array_remove(role_ids, $1), updated_at = NOW() \
             WHERE $1 = ANY(role_ids)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to detach role from users", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit role deletion", e)
        })?;
        Ok(())
    }
}
