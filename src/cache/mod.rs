//! Cache Module
//!
//! A process-wide key-value store with per-key expiry and atomic increment,
//! backed by either an external shared store or an in-process map. The
//! backend is selected once at startup; consumers see only `CacheService`.

mod backend;
mod entry;
mod memory;
mod redis;
mod service;


// Re-export public types
pub use backend::{StoreBackend, StoreError};
pub use entry::{current_timestamp_ms, current_timestamp_secs, CacheEntry};
pub use memory::MemoryStore;
pub use self::redis::{RedisConfig, RedisStore};
pub use service::CacheService;

// == Public Constants ==
/// Default TTL in seconds for session payloads when none is configured
pub const DEFAULT_SESSION_TTL: u64 = 300;

/// Live-entry count above which a write to the in-process backend sweeps
/// all expired entries
pub const MEMORY_SWEEP_THRESHOLD: usize = 1000;
