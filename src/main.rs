//! School CRM API - backend core
//!
//! Cached session authorization and per-route rate limiting over a
//! process-wide cache store.

mod api;
mod auth;
mod cache;
mod config;
mod error;
mod models;
mod ratelimit;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use auth::{SessionService, SupabaseDirectory};
use cache::{CacheService, MemoryStore, RedisConfig, RedisStore, StoreBackend};
use config::Config;
use ratelimit::RateLimiter;
use tasks::spawn_sweep_task;

/// Main entry point for the CRM backend.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Select the cache store backend (external store or in-process map)
/// 4. Assemble the cache, session and rate-limit services
/// 5. Start the expiry sweep task when the in-process backend is used
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting School CRM API");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, session_ttl={}s, external_store={}",
        config.server_port,
        config.session_cache_ttl,
        config.redis_url.is_some()
    );
    if config.supabase_url.is_empty() || config.supabase_service_key.is_empty() {
        warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY missing; credential verification will fail");
    }

    // Select the store backend once for the process lifetime. The sweep
    // task only exists for the in-process map; the external store expires
    // keys natively.
    let (backend, memory_store): (Box<dyn StoreBackend>, Option<Arc<MemoryStore>>) =
        match &config.redis_url {
            Some(url) => match RedisStore::connect(RedisConfig::new(url)).await {
                Ok(store) => {
                    info!("Connected to external cache store");
                    (Box::new(store), None)
                }
                Err(e) => {
                    error!(
                        error = %e,
                        "Failed to connect to external store, using in-process cache"
                    );
                    let store = Arc::new(MemoryStore::new());
                    (Box::new(Arc::clone(&store)), Some(store))
                }
            },
            None => {
                info!("No external store configured, using in-process cache");
                let store = Arc::new(MemoryStore::new());
                (Box::new(Arc::clone(&store)), Some(store))
            }
        };

    let cache = Arc::new(CacheService::new(backend));

    // Assemble the services around the shared cache
    let directory = Arc::new(SupabaseDirectory::new(
        &config.supabase_url,
        &config.supabase_service_key,
    ));
    let sessions = Arc::new(SessionService::new(
        Arc::clone(&cache),
        directory.clone(),
        directory.clone(),
        directory,
        config.session_cache_ttl,
        config.session_key_prefix_len,
    ));
    let limiter = Arc::new(RateLimiter::new(
        Arc::clone(&cache),
        config.route_classes.clone(),
    ));
    let state = AppState::new(cache, sessions, limiter);

    // Start background sweep for the in-process backend
    let sweep_handle =
        memory_store.map(|store| spawn_sweep_task(store, config.sweep_interval));

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // ConnectInfo feeds the rate limiter's client identity
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(sweep_handle))
    .await
    .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
