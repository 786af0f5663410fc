//! Authorization Gates
//!
//! Role and permission checks over a `ResolvedIdentity`. 403 reasons are
//! specific (role vs permission) since, unlike authentication failures,
//! the distinction is not security-sensitive.

use crate::auth::ResolvedIdentity;
use crate::error::{ApiError, Result};

// == Role Gate ==
/// Permits iff the identity's role name is in the allow-list.
pub fn require_role(identity: &ResolvedIdentity, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|role| *role == identity.role_name) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Insufficient role".to_string()))
    }
}

// == Permission Gate ==
/// Permits iff the identity's permission set grants `key`, explicitly or
/// through the wildcard.
pub fn require_permission(identity: &ResolvedIdentity, key: &str) -> Result<()> {
    if identity.permissions.allows(key) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Insufficient permissions".to_string()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PermissionSet;

    fn identity(role: &str, perms: &[(&str, bool)]) -> ResolvedIdentity {
        ResolvedIdentity {
            user_id: "u-1".to_string(),
            email: "casey@school.test".to_string(),
            display_name: None,
            role_name: role.to_string(),
            account_status: "active".to_string(),
            permissions: perms
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<PermissionSet>(),
            cached_at: 0,
        }
    }

    #[test]
    fn test_role_gate_allows_listed_role() {
        let id = identity("manager", &[]);
        assert!(require_role(&id, &["admin", "manager"]).is_ok());
    }

    #[test]
    fn test_role_gate_rejects_unlisted_role() {
        let id = identity("counselor", &[]);
        let err = require_role(&id, &["admin"]).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_role_gate_is_case_sensitive_on_resolved_name() {
        let id = identity("Admin", &[]);
        assert!(require_role(&id, &["admin"]).is_err());
    }

    #[test]
    fn test_permission_gate_wildcard() {
        let id = identity("admin", &[("*", true)]);
        assert!(require_permission(&id, "anything.delete").is_ok());
    }

    #[test]
    fn test_permission_gate_specific_key() {
        let id = identity("counselor", &[("leads.view", true)]);
        assert!(require_permission(&id, "leads.view").is_ok());
        let err = require_permission(&id, "leads.delete").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_permission_gate_empty_set_denies() {
        let id = identity("counselor", &[]);
        assert!(require_permission(&id, "leads.view").is_err());
        // A role gate on the same identity still functions
        assert!(require_role(&id, &["counselor"]).is_ok());
    }
}
