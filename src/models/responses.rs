//! Response DTOs for the CRM backend API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::auth::ResolvedIdentity;

/// Response body for the root endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    /// Welcome message
    pub message: String,
    /// Service status
    pub status: String,
}

impl RootResponse {
    pub fn active() -> Self {
        Self {
            message: "Welcome to the School CRM API".to_string(),
            status: "active".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /api/v1/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "ok")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the identity endpoint (GET /api/v1/auth/me)
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// The resolved identity behind the presented credential
    pub user: ResolvedIdentity,
    /// The identity's role name, surfaced for UI convenience
    pub role: String,
}

impl MeResponse {
    pub fn new(user: ResolvedIdentity) -> Self {
        let role = user.role_name.clone();
        Self { user, role }
    }
}

/// Response body for the cache purge endpoint
/// (DELETE /api/v1/admin/cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    /// Success message
    pub message: String,
    /// The key that was purged
    pub key: String,
}

impl PurgeResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Cache key '{}' purged", key),
            key,
        }
    }
}
