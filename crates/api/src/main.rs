//! Mercata API server binary.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used)]

use mercata_api::config::{ApiConfig, StoreBackend};
use mercata_api::db::{Stores, create_pool};
use mercata_api::{AppState, app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // .env is optional; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = ApiConfig::from_env().expect("Failed to load configuration");

    let (stores, pool) = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .clone()
                .expect("MERCATA_DATABASE_URL required for the postgres backend");
            let pool = create_pool(&database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");
            (Stores::postgres(pool.clone()), Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (Stores::in_memory(), None)
        }
    };

    // NOTE: Migrations are NOT run automatically on startup. Apply
    // crates/api/migrations/ out-of-band before first boot.

    let addr = config.socket_addr();
    let state = AppState::new(config, stores, pool);

    tracing::info!("api listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Initialize tracing with EnvFilter; JSON output when running on Fly.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mercata_api=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var("FLY_APP_NAME").is_ok() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
