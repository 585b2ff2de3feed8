//! Quidditch League Server - fantasy league backend
//!
//! This is the main entry point for the server. It handles:
//! - Authenticated CRUD endpoints for users, leagues, teams and players
//! - Game scheduling and interval logs
//! - The match simulation core: lineups, performance, movement, snitch

mod app;
mod config;
mod game;
mod http;
mod store;
mod util;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::http::build_router;
use crate::store::users::ROLE_ADMIN;
use crate::store::StoreError;
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Quidditch League Server");
    info!("Server address: {}", config.server_addr);

    // Create application state
    let state = AppState::new(config.clone());

    // Create the startup admin account, if configured
    ensure_bootstrap_admin(&state)?;

    // Build router
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Create the configured admin account unless it already exists
fn ensure_bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(admin) = &state.config.bootstrap_admin else {
        return Ok(());
    };

    let hash = bcrypt::hash(&admin.password, bcrypt::DEFAULT_COST)?;
    match state.users.create(&admin.username, &hash, ROLE_ADMIN) {
        Ok(user) => info!(username = %user.username, "bootstrap admin created"),
        Err(StoreError::Conflict(_)) => {
            info!(username = %admin.username, "bootstrap admin already exists");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
