//! API Handlers
//!
//! HTTP request handlers for the CRM backend endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::auth::{require_permission, require_role, ResolvedIdentity, SessionService};
use crate::cache::CacheService;
use crate::error::Result;
use crate::models::{HealthResponse, MeResponse, PurgeResponse, RootResponse};
use crate::ratelimit::RateLimiter;

// == App State ==
/// Application state shared across all handlers and middleware.
///
/// The cache service is the single process-wide store facade; the session
/// service and rate limiter both borrow it.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheService>,
    pub sessions: Arc<SessionService>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates a new AppState from the assembled services.
    pub fn new(
        cache: Arc<CacheService>,
        sessions: Arc<SessionService>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            cache,
            sessions,
            limiter,
        }
    }
}

/// Handler for GET /
///
/// Service banner.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse::active())
}

/// Handler for GET /api/v1/health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handler for GET /api/v1/auth/me
///
/// Echoes the resolved identity behind the presented credential.
/// Role-gated to the staff roles that may use the system.
pub async fn me_handler(Extension(identity): Extension<ResolvedIdentity>) -> Result<Json<MeResponse>> {
    require_role(&identity, &["admin", "manager", "counselor"])?;
    Ok(Json(MeResponse::new(identity)))
}

/// Handler for DELETE /api/v1/admin/cache/:key
///
/// Purges one cache key, e.g. to force a session rebuild after a role
/// change. Permission-gated.
pub async fn purge_cache_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Path(key): Path<String>,
) -> Result<Json<PurgeResponse>> {
    require_permission(&identity, "admin.cache.purge")?;

    state.cache.delete(&key).await;
    Ok(Json(PurgeResponse::new(key)))
}
