//! Bank Transfer API - Main Application Entry Point
//!
//! This is a REST API server for users, bank accounts, balance transfers and
//! balance history. Every endpoint except the health check requires a bearer
//! token.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries), behind the `BankStore` trait
//! - **Authentication**: Per-user bearer tokens with SHA-256 hashing
//! - **Money**: `rust_decimal` fixed-point values with two fractional digits
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Create the bootstrap superuser if `ADMIN_TOKEN` is set
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{app::AppState, services::user_service, storage::PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config).await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database pool created"
    );

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let store = Arc::new(PgStore::new(pool));

    if let Some(token) = config.admin_token.as_deref() {
        user_service::ensure_superuser(store.as_ref(), &config.admin_username, token).await?;
    } else {
        tracing::warn!("ADMIN_TOKEN not set; no bootstrap superuser created");
    }

    let app = app::router(AppState::new(store));

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
