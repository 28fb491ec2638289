//! User management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use gatekeeper_core::error::AppError;
use gatekeeper_core::types::{PageRequest, PageResponse};
use gatekeeper_entity::user::{CreateUser, UpdateUser};

use crate::dto::request::{validate, CreateUserRequest, UpdateUserRequest};
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, ApiError> {
    state.permissions.authorize(&auth, &["users:read"]).await?;

    let users = state.users.find_all(page).await?;
    let page = PageResponse::new(
        users.items.into_iter().map(UserResponse::from).collect(),
        users.page,
        users.page_size,
        users.total_items,
    );
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state.permissions.authorize(&auth, &["users:read"]).await?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["users:create"])
        .await?;
    validate(&req)?;

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .users
        .create(CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["users:update"])
        .await?;
    validate(&req)?;

    let password_hash = match &req.password {
        Some(pw) => Some(state.password_hasher.hash_password(pw)?),
        None => None,
    };
    let user = state
        .users
        .update(
            id,
            UpdateUser {
                email: req.email,
                name: req.name,
                password_hash,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<crate::dto::response::MessageResponse>>, ApiError> {
    state
        .permissions
        .authorize(&auth, &["users:delete"])
        .await?;

    state.users.delete(id).await?;

    Ok(Json(ApiResponse::ok(
        crate::dto::response::MessageResponse {
            message: "User deleted".to_string(),
        },
    )))
}
