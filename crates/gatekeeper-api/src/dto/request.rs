//! Request DTOs with validation rules.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use gatekeeper_core::error::AppError;

/// Run the declared validation rules, mapping failures to a 400 error.
pub fn validate(req: &impl Validate) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// POST /auth/login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// POST /auth/refresh
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

/// POST /auth/logout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

/// POST /users
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address, must be unique.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub name: String,
    /// Plaintext password; hashed before storage.
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// PUT /users/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address.
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// New display name.
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub name: Option<String>,
    /// New plaintext password; hashed before storage.
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
}

/// POST /roles
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleRequest {
    /// Role name, must be unique.
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: String,
    /// Permission strings granted by the role.
    pub permissions: Vec<String>,
}

/// PUT /roles/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    /// New role name.
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: Option<String>,
    /// Replacement permission set.
    pub permissions: Option<Vec<String>>,
}

/// POST /roles/assign and /roles/unassign
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleRequest {
    /// The user whose role set changes.
    pub user_id: Uuid,
    /// The role to add or remove.
    pub role_id: Uuid,
}
