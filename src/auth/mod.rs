//! Auth Module
//!
//! Session memoization and authorization over the identity, profile and
//! role collaborators.
//!
//! # Flow
//! - `SessionService::resolve` - credential -> `ResolvedIdentity`, cached
//! - `require_session` - axum layer feeding handlers the identity
//! - `require_role` / `require_permission` - gates over the identity

mod gates;
mod identity;
mod middleware;
mod providers;
mod session;
mod supabase;

// Re-export public types
pub use gates::{require_permission, require_role};
pub use identity::{PermissionSet, ResolvedIdentity, WILDCARD_PERMISSION};
pub use middleware::require_session;
pub use providers::{Identity, IdentityProvider, Profile, ProfileStore, ProviderError, RoleStore};
pub use session::SessionService;
pub use supabase::SupabaseDirectory;
