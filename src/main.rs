//! Gatekeeper Server — token lifecycle and RBAC authorization service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("GATEKEEPER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatekeeper v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    let db = gatekeeper_database::DatabasePool::connect(&config.database).await?;
    gatekeeper_database::migration::run_migrations(db.pool()).await?;

    // Cache (revocation list backend)
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(gatekeeper_cache::CacheManager::new(&config.cache).await?);

    // Stores
    let users: Arc<dyn gatekeeper_entity::UserStore> = Arc::new(
        gatekeeper_database::repositories::UserRepository::new(db.pool().clone()),
    );
    let roles: Arc<dyn gatekeeper_entity::RoleStore> = Arc::new(
        gatekeeper_database::repositories::RoleRepository::new(db.pool().clone()),
    );

    // Default permission set; a broken file is a startup failure.
    let defaults = gatekeeper_auth::DefaultPermissions::load(&config.auth.default_permissions_file)?;

    // Auth system
    tracing::info!("Initializing authentication system");
    let lookup_timeout = config.auth.lookup_timeout();
    let codec = gatekeeper_auth::TokenCodec::new(&config.auth);
    let revocation = gatekeeper_auth::RevocationStore::new(Arc::clone(&cache), lookup_timeout);
    let hasher = gatekeeper_auth::PasswordHasher::new();
    let tokens = Arc::new(gatekeeper_auth::TokenService::new(
        codec,
        revocation,
        Arc::clone(&users),
        hasher.clone(),
        lookup_timeout,
    ));
    let permissions = Arc::new(gatekeeper_auth::PermissionResolver::new(
        Arc::clone(&roles),
        defaults,
        lookup_timeout,
    ));

    let state = gatekeeper_api::AppState {
        config: Arc::new(config.clone()),
        cache,
        tokens,
        permissions,
        password_hasher: Arc::new(hasher),
        users,
        roles,
    };

    let app = gatekeeper_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(%addr, "Gatekeeper listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
