//! School CRM API - backend core
//!
//! Cached session authorization and per-route rate limiting over a
//! process-wide cache store with two backends (external shared store or
//! in-process map).

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
