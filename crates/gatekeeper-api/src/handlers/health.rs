//! Health probe.

use axum::extract::State;
use axum::Json;

use gatekeeper_core::traits::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Liveness probe; requires no authentication. Reports whether the
/// cache backend (and with it the revocation list) is reachable.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_ok = state.cache.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if cache_ok { "ok" } else { "degraded" }.to_string(),
        cache: cache_ok,
    })
}
