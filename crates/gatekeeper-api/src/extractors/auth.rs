//! `AuthUser` extractor — pulls the JWT from the Authorization header,
//! verifies it, and loads the current principal.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::time::timeout;
use tracing::error;

use gatekeeper_core::error::AppError;
use gatekeeper_entity::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, available to any handler that declares it.
///
/// The principal is re-fetched on every request, so a deleted user's
/// outstanding access tokens stop working immediately.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.tokens.verify_access(token)?;

        // A store outage on the verification path is not exposed to the
        // caller; the request is simply not authenticated.
        let found = match timeout(
            state.config.auth.lookup_timeout(),
            state.users.find_by_id(claims.sub),
        )
        .await
        {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                error!(error = %e, "User lookup failed during authentication");
                return Err(AppError::unauthorized("Unable to verify credentials").into());
            }
            Err(_) => {
                error!("User lookup timed out during authentication");
                return Err(AppError::unauthorized("Unable to verify credentials").into());
            }
        };

        let user = found.ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        Ok(AuthUser(user))
    }
}
