//! Hosted Service Directory
//!
//! One client implementing all three auth collaborators against the hosted
//! auth/database service's REST API: identity verification via the auth
//! endpoint, profiles and roles via the table endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::auth::{
    Identity, IdentityProvider, PermissionSet, Profile, ProfileStore, ProviderError, RoleStore,
};

// == Supabase Directory ==
/// REST client for the hosted service, authenticated with the service
/// role key.
pub struct SupabaseDirectory {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseDirectory {
    // == Constructor ==
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("default TLS backend");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    /// Fetches rows from a table endpoint with the given filter.
    async fn select<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        filter: (&str, String),
    ) -> Result<Vec<T>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&[filter, ("select", "*".to_string())])
            .send()
            .await
            .map_err(|e| ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError(format!(
                "{} query returned {}",
                table,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseDirectory {
    async fn verify_credential(&self, token: &str) -> Result<Option<Identity>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let identity = response
                .json::<Identity>()
                .await
                .map_err(|e| ProviderError(e.to_string()))?;
            Ok(Some(identity))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // The service answers 401/403 for unverifiable tokens; that is
            // a negative answer, not a transport failure
            Ok(None)
        } else {
            Err(ProviderError(format!("auth endpoint returned {}", status)))
        }
    }
}

#[async_trait]
impl ProfileStore for SupabaseDirectory {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProviderError> {
        let rows: Vec<Profile> = self
            .select("profiles", ("id", format!("eq.{}", user_id)))
            .await?;
        Ok(rows.into_iter().next())
    }
}

// == Role Row ==
/// Raw role record; the permissions column arrives either as a JSON
/// object or as a string-encoded one depending on how it was written.
#[derive(Debug, Deserialize)]
struct RoleRow {
    name: String,
    permissions: Value,
}

impl RoleRow {
    fn into_permission_set(self) -> PermissionSet {
        let parsed = match self.permissions {
            Value::String(raw) => serde_json::from_str(&raw),
            other => serde_json::from_value(other),
        };
        parsed.unwrap_or_else(|e| {
            warn!(role = %self.name, error = %e, "role permissions undecodable, denying all");
            PermissionSet::empty()
        })
    }
}

#[async_trait]
impl RoleStore for SupabaseDirectory {
    async fn get_role_permissions(
        &self,
        role_name: &str,
    ) -> Result<Option<PermissionSet>, ProviderError> {
        // ilike makes the name match case-insensitive
        let rows: Vec<RoleRow> = self
            .select("custom_roles", ("name", format!("ilike.{}", role_name)))
            .await?;
        Ok(rows.into_iter().next().map(RoleRow::into_permission_set))
    }
}
