//! Fixed-Window Rate Limiter
//!
//! Counts requests per client and route class through the store's atomic
//! increment; the counter's expiry is the window boundary, so no sweep or
//! reset pass exists.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::cache::CacheService;
use crate::error::ApiError;
use crate::ratelimit::{classify, RouteClass};

// == Rate Decision ==
/// Outcome of the pre-handler check.
#[derive(Debug, Clone, PartialEq)]
pub enum RateDecision {
    /// Under the ceiling; quota headers describe what is left
    Allow { limit: u64, remaining: u64 },
    /// Over the ceiling; reject with 429 and a Retry-After
    Reject { limit: u64, window_seconds: u64 },
    /// Store failure: fail open and forward unthrottled, without quota
    /// headers
    Unprotected,
}

// == Rate Limiter ==
/// Pre-handler gate, independent of and prior to authentication.
pub struct RateLimiter {
    cache: Arc<CacheService>,
    classes: Vec<RouteClass>,
}

impl RateLimiter {
    // == Constructor ==
    pub fn new(cache: Arc<CacheService>, classes: Vec<RouteClass>) -> Self {
        Self { cache, classes }
    }

    // == Check ==
    /// Classifies the route, counts the request, and decides.
    ///
    /// Each class keeps its own counter per client, so an auth-route burst
    /// can neither consume nor hide behind the general pool's quota.
    ///
    /// `client_ip` is the raw peer address; behind a reverse proxy every
    /// client collapses to the proxy's address, so deployments with a
    /// proxy in front need identity derivation at that tier.
    pub async fn check(&self, client_ip: &str, path: &str) -> RateDecision {
        let class = classify(&self.classes, path);
        let key = format!("rate_limit:{}:{}", client_ip, class.tag);

        match self.cache.incr(&key, class.window_seconds).await {
            Ok(count) if count > class.limit => {
                debug!(key, count, limit = class.limit, "request over quota");
                RateDecision::Reject {
                    limit: class.limit,
                    window_seconds: class.window_seconds,
                }
            }
            Ok(count) => RateDecision::Allow {
                limit: class.limit,
                remaining: class.limit.saturating_sub(count),
            },
            Err(e) => {
                // Fail open: quota protection must never turn a degraded
                // cache tier into a total outage
                error!(key, error = %e, "rate limit counter unavailable, failing open");
                RateDecision::Unprotected
            }
        }
    }
}

// == Rate Limit Middleware ==
/// Outermost request layer: rejects over-quota requests before any other
/// processing, and attaches quota headers to allowed responses.
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = request.uri().path().to_string();

    match limiter.check(&client_ip, &path).await {
        RateDecision::Reject {
            limit,
            window_seconds,
        } => ApiError::RateLimited {
            limit,
            window_seconds,
        }
        .into_response(),
        RateDecision::Allow { limit, remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", numeric_header(limit));
            headers.insert("X-RateLimit-Remaining", numeric_header(remaining));
            response
        }
        RateDecision::Unprotected => next.run(request).await,
    }
}

fn numeric_header(n: u64) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).expect("numeric header value")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, StoreBackend, StoreError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingStore;

    #[async_trait]
    impl StoreBackend for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), StoreError> {
            Err(StoreError::Timeout)
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Timeout)
        }

        async fn incr(&self, _key: &str, _ttl: u64) -> Result<u64, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    fn limiter_with_classes(classes: Vec<RouteClass>) -> RateLimiter {
        let cache = Arc::new(CacheService::new(Box::new(MemoryStore::new())));
        RateLimiter::new(cache, classes)
    }

    fn single_class(limit: u64, window_seconds: u64) -> Vec<RouteClass> {
        vec![RouteClass::new("default", &[""], limit, window_seconds)]
    }

    #[tokio::test]
    async fn test_requests_under_limit_count_down_remaining() {
        let limiter = limiter_with_classes(single_class(3, 60));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("10.0.0.1", "/api/v1/leads").await;
            assert_eq!(
                decision,
                RateDecision::Allow {
                    limit: 3,
                    remaining: expected_remaining
                }
            );
        }
    }

    #[tokio::test]
    async fn test_request_over_limit_rejected() {
        let limiter = limiter_with_classes(single_class(3, 60));

        for _ in 0..3 {
            limiter.check("10.0.0.1", "/api/v1/leads").await;
        }

        let decision = limiter.check("10.0.0.1", "/api/v1/leads").await;
        assert_eq!(
            decision,
            RateDecision::Reject {
                limit: 3,
                window_seconds: 60
            }
        );
    }

    #[tokio::test]
    async fn test_window_expiry_resets_quota() {
        let limiter = limiter_with_classes(single_class(3, 1));

        for _ in 0..4 {
            limiter.check("10.0.0.1", "/api/v1/leads").await;
        }
        assert!(matches!(
            limiter.check("10.0.0.1", "/api/v1/leads").await,
            RateDecision::Reject { .. }
        ));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(
            limiter.check("10.0.0.1", "/api/v1/leads").await,
            RateDecision::Allow {
                limit: 3,
                remaining: 2
            }
        );
    }

    #[tokio::test]
    async fn test_clients_counted_separately() {
        let limiter = limiter_with_classes(single_class(1, 60));

        assert!(matches!(
            limiter.check("10.0.0.1", "/x").await,
            RateDecision::Allow { .. }
        ));
        assert!(matches!(
            limiter.check("10.0.0.2", "/x").await,
            RateDecision::Allow { .. }
        ));
        assert!(matches!(
            limiter.check("10.0.0.1", "/x").await,
            RateDecision::Reject { .. }
        ));
    }

    #[tokio::test]
    async fn test_route_classes_have_independent_pools() {
        let classes = vec![
            RouteClass::new("auth", &["/api/v1/auth"], 1, 60),
            RouteClass::new("default", &[""], 2, 60),
        ];
        let limiter = limiter_with_classes(classes);

        // Exhaust the auth pool
        limiter.check("10.0.0.1", "/api/v1/auth/me").await;
        assert!(matches!(
            limiter.check("10.0.0.1", "/api/v1/auth/me").await,
            RateDecision::Reject { .. }
        ));

        // The general pool is untouched
        assert_eq!(
            limiter.check("10.0.0.1", "/api/v1/leads").await,
            RateDecision::Allow {
                limit: 2,
                remaining: 1
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let cache = Arc::new(CacheService::new(Box::new(FailingStore)));
        let limiter = RateLimiter::new(cache, single_class(1, 60));

        for _ in 0..5 {
            assert_eq!(
                limiter.check("10.0.0.1", "/x").await,
                RateDecision::Unprotected
            );
        }
    }
}
