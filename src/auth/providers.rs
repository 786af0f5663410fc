//! Auth Collaborator Contracts
//!
//! The external services the session memoizer consults: identity
//! verification, profile lookup and role lookup. Implemented elsewhere
//! (hosted service client, test stubs); only the contracts live here.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::PermissionSet;

// == Provider Error ==
/// Transport or service failure from a collaborator call.
///
/// Distinct from a negative answer: "no such profile" is `Ok(None)`, not
/// an error.
#[derive(Error, Debug)]
#[error("auth provider error: {0}")]
pub struct ProviderError(pub String);

// == Identity ==
/// A verified identity as returned by the identity service.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

// == Profile ==
/// The provisioning record held in the store-of-record.
///
/// Its existence is what admits an identity into the system at all
/// (invite-only policy); it also names the identity's role.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "active".to_string()
}

// == Identity Provider ==
/// Exchanges a bearer credential for a verified identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns `Ok(None)` when the credential does not verify.
    async fn verify_credential(&self, token: &str) -> Result<Option<Identity>, ProviderError>;
}

// == Profile Store ==
/// Looks up the provisioning record for a verified identity.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProviderError>;
}

// == Role Store ==
/// Resolves a role name to its permission map.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Lookup is case-insensitive on the role name. `Ok(None)` when no
    /// role record matches.
    async fn get_role_permissions(
        &self,
        role_name: &str,
    ) -> Result<Option<PermissionSet>, ProviderError>;
}
