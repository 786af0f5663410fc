//! API Module
//!
//! HTTP handlers and routing for the CRM backend REST API.
//!
//! # Endpoints
//! - `GET /` - service banner
//! - `GET /api/v1/health` - health check
//! - `GET /api/v1/auth/me` - resolved identity (authenticated)
//! - `DELETE /api/v1/admin/cache/:key` - cache purge (authenticated)

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
