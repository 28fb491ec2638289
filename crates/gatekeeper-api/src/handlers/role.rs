//! Role management handlers, including role assignment.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use gatekeeper_core::error::AppError;
use gatekeeper_core::types::{PageRequest, PageResponse};
use gatekeeper_entity::role::{CreateRole, UpdateRole};

use crate::dto::request::{validate, AssignRoleRequest, CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse, RoleResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/roles
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<PageResponse<RoleResponse>>>, ApiError> {
    state.permissions.authorize(&auth, &["roles:read"]).await?;

    let roles = state.roles.find_all(page).await?;
    let page = PageResponse::new(
        roles.items.into_iter().map(RoleResponse::from).collect(),
        roles.page,
        roles.page_size,
        roles.total_items,
    );
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/roles/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    state.permissions.authorize(&auth, &["roles:read"]).await?;

    let role = state
        .roles
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;

    Ok(Json(ApiResponse::ok(role.into())))
}

/// POST /api/roles
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["roles:create"])
        .await?;
    validate(&req)?;

    let role = state
        .roles
        .create(CreateRole {
            name: req.name,
            permissions: req.permissions,
        })
        .await?;

    Ok(Json(ApiResponse::ok(role.into())))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["roles:update"])
        .await?;
    validate(&req)?;

    let role = state
        .roles
        .update(
            id,
            UpdateRole {
                name: req.name,
                permissions: req.permissions,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(role.into())))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["roles:delete"])
        .await?;

    state.roles.delete(id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Role deleted".to_string(),
    })))
}

/// POST /api/roles/assign
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["roles:assign"])
        .await?;

    // The role must exist; a stale id would silently grant nothing.
    state
        .roles
        .find_by_id(req.role_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {} not found", req.role_id)))?;

    let user = state.users.assign_role(req.user_id, req.role_id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/roles/unassign
pub async fn unassign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["roles:unassign"])
        .await?;

    let user = state.users.unassign_role(req.user_id, req.role_id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
