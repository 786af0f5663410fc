//! Resolved Identity Module
//!
//! The session payload assembled from the verification, profile and role
//! lookups, plus the typed permission set it carries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::current_timestamp_secs;

// == Permission Set ==
/// Wildcard key granting every permission.
pub const WILDCARD_PERMISSION: &str = "*";

/// Typed mapping from permission key to grant flag.
///
/// A role's permission JSON deserializes straight into this; the wildcard
/// sentinel is checked explicitly rather than by key enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(HashMap<String, bool>);

impl PermissionSet {
    // == Constructor ==
    /// Creates an empty set: every permission-gated action denies.
    pub fn empty() -> Self {
        Self::default()
    }

    // == Allows ==
    /// True iff the set grants every permission, or grants `key` explicitly.
    pub fn allows(&self, key: &str) -> bool {
        self.grants(WILDCARD_PERMISSION) || self.grants(key)
    }

    fn grants(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Returns the number of explicit grants, wildcard included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// == Resolved Identity ==
/// The memoized result of the credential resolution chain.
///
/// Derived, not authoritative: the identity, profile and role records
/// remain the source of truth, and the whole value is rebuilt from scratch
/// whenever absent or expired, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role_name: String,
    pub account_status: String,
    pub permissions: PermissionSet,
    /// Unix seconds at assembly time; the memoizer's freshness check reads
    /// this rather than relying on the store's physical TTL
    pub cached_at: u64,
}

impl ResolvedIdentity {
    /// Seconds elapsed since this identity was assembled.
    pub fn age_seconds(&self) -> u64 {
        current_timestamp_secs().saturating_sub(self.cached_at)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, bool)]) -> PermissionSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_wildcard_grants_everything() {
        let perms = set(&[("*", true)]);
        assert!(perms.allows("anything.delete"));
        assert!(perms.allows("leads.view"));
    }

    #[test]
    fn test_specific_grant() {
        let perms = set(&[("leads.view", true)]);
        assert!(perms.allows("leads.view"));
        assert!(!perms.allows("leads.delete"));
    }

    #[test]
    fn test_false_grant_denies() {
        let perms = set(&[("leads.view", false), ("*", false)]);
        assert!(!perms.allows("leads.view"));
        assert!(!perms.allows("anything"));
    }

    #[test]
    fn test_empty_set_denies_all() {
        let perms = PermissionSet::empty();
        assert!(perms.is_empty());
        assert!(!perms.allows("leads.view"));
    }

    #[test]
    fn test_permission_set_deserializes_from_role_json() {
        let perms: PermissionSet =
            serde_json::from_str(r#"{"leads.view": true, "leads.delete": false}"#).unwrap();
        assert!(perms.allows("leads.view"));
        assert!(!perms.allows("leads.delete"));
        assert_eq!(perms.len(), 2);
    }

    #[test]
    fn test_resolved_identity_roundtrip() {
        let identity = ResolvedIdentity {
            user_id: "u-1".to_string(),
            email: "counselor@school.test".to_string(),
            display_name: Some("Casey Counselor".to_string()),
            role_name: "counselor".to_string(),
            account_status: "active".to_string(),
            permissions: set(&[("leads.view", true)]),
            cached_at: 1_700_000_000,
        };

        let json = serde_json::to_string(&identity).unwrap();
        let restored: ResolvedIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, identity);
    }
}
