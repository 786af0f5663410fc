//! Rate Limit Module
//!
//! Fixed-window request counting per client and route class, delegated to
//! the cache store's atomic increment. Fails open: a degraded store tier
//! lets traffic through unthrottled rather than blocking it.

mod classes;
mod limiter;

// Re-export public types
pub use classes::{classify, default_route_classes, RouteClass};
pub use limiter::{enforce_rate_limit, RateDecision, RateLimiter};
