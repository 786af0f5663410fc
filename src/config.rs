//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_SESSION_TTL;
use crate::ratelimit::{default_route_classes, RouteClass};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// External shared-store connection string; absent means the in-process
    /// map backend is used (single-process consistency only)
    pub redis_url: Option<String>,
    /// Session memoization TTL in seconds; 0 disables caching entirely,
    /// forcing re-verification on every request
    pub session_cache_ttl: u64,
    /// Number of leading credential characters used to form the session
    /// cache key. Longer prefixes lower the collision risk between distinct
    /// credentials; size this to the security requirements of the deployment.
    pub session_key_prefix_len: usize,
    /// Interval in seconds between expiry sweeps of the in-process backend
    pub sweep_interval: u64,
    /// Ordered rate-limit class table, first match wins
    pub route_classes: Vec<RouteClass>,
    /// Hosted auth/database service base URL
    pub supabase_url: String,
    /// Hosted service role key
    pub supabase_service_key: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `REDIS_URL` - external store URL (absent: in-process backend)
    /// - `SESSION_CACHE_TTL` - session TTL in seconds, 0 disables (default: 300)
    /// - `SESSION_KEY_PREFIX_LEN` - credential prefix length (default: 16)
    /// - `SWEEP_INTERVAL` - expiry sweep frequency in seconds (default: 30)
    /// - `RATE_LIMIT_AUTH` / `RATE_LIMIT_ADMIN` / `RATE_LIMIT_DOCS` /
    ///   `RATE_LIMIT_DEFAULT` - per-class overrides as `limit:window_seconds`
    /// - `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY` - hosted service
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            session_cache_ttl: env::var("SESSION_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL),
            session_key_prefix_len: env::var("SESSION_KEY_PREFIX_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            route_classes: route_classes_from_env(),
            supabase_url: env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            redis_url: None,
            session_cache_ttl: DEFAULT_SESSION_TTL,
            session_key_prefix_len: 16,
            sweep_interval: 30,
            route_classes: default_route_classes(),
            supabase_url: String::new(),
            supabase_service_key: String::new(),
        }
    }
}

/// Builds the class table, applying any `limit:window_seconds` overrides
/// from the environment to the matching class tag.
fn route_classes_from_env() -> Vec<RouteClass> {
    let mut classes = default_route_classes();
    for class in classes.iter_mut() {
        let var = format!("RATE_LIMIT_{}", class.tag.to_uppercase());
        if let Some((limit, window)) = env::var(var).ok().as_deref().and_then(parse_limit_spec) {
            class.limit = limit;
            class.window_seconds = window;
        }
    }
    classes
}

/// Parses a `limit:window_seconds` pair, e.g. `100:60`.
fn parse_limit_spec(spec: &str) -> Option<(u64, u64)> {
    let (limit, window) = spec.split_once(':')?;
    Some((limit.trim().parse().ok()?, window.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.session_cache_ttl, 300);
        assert_eq!(config.session_key_prefix_len, 16);
        assert!(config.redis_url.is_none());
        assert_eq!(config.route_classes.len(), 4);
    }

    #[test]
    fn test_parse_limit_spec() {
        assert_eq!(parse_limit_spec("100:60"), Some((100, 60)));
        assert_eq!(parse_limit_spec("10 : 30"), Some((10, 30)));
        assert_eq!(parse_limit_spec("100"), None);
        assert_eq!(parse_limit_spec("a:b"), None);
    }

    #[test]
    fn test_rate_limit_override_from_env() {
        env::set_var("RATE_LIMIT_DOCS", "500:120");
        let classes = route_classes_from_env();
        env::remove_var("RATE_LIMIT_DOCS");

        let docs = classes.iter().find(|c| c.tag == "docs").unwrap();
        assert_eq!(docs.limit, 500);
        assert_eq!(docs.window_seconds, 120);
    }
}
