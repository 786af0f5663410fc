//! Session Middleware
//!
//! Extracts the bearer credential, resolves it through the session
//! memoizer, and hands the `ResolvedIdentity` to handlers as a request
//! extension. Rejection is always 401 with a generic body.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::SessionService;
use crate::error::ApiError;

// == Bearer Extraction ==
/// Pulls the credential out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// == Session Middleware ==
/// Layer for routes that require an authenticated identity.
///
/// On success the request gains a `ResolvedIdentity` extension; handlers
/// apply their own role/permission gates on top of it.
pub async fn require_session(
    State(sessions): State<Arc<SessionService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => return ApiError::Unauthenticated.into_response(),
    };

    match sessions.resolve(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let headers = headers_with("Basic dXNlcjpwdw==");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_empty_token_rejected() {
        let headers = headers_with("Bearer ");
        assert_eq!(bearer_token(&headers), None);
    }
}
