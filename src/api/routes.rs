//! API Routes
//!
//! Configures the Axum router with all endpoints and the middleware
//! stack: rate limiting outermost, session resolution on the protected
//! subtree.

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, me_handler, purge_cache_handler, root_handler, AppState,
};
use crate::auth::require_session;
use crate::ratelimit::enforce_rate_limit;

/// Creates the main router.
///
/// # Endpoints
/// - `GET /` - service banner
/// - `GET /api/v1/health` - health check
/// - `GET /api/v1/auth/me` - resolved identity (authenticated)
/// - `DELETE /api/v1/admin/cache/:key` - cache purge (authenticated)
///
/// # Middleware
/// - Rate limiting: wraps every route, before authentication
/// - Session resolution: protected subtree only
/// - CORS + Tracing: as for any public API
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/api/v1/auth/me", get(me_handler))
        .route("/api/v1/admin/cache/:key", delete(purge_cache_handler))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/health", get(health_handler))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            enforce_rate_limit,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
