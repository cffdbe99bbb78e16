//! Fund Subscription Service - Main Application Entry Point
//!
//! A single-tenant REST API for a small fund-subscription book: one user,
//! five predefined investment funds, operations to subscribe, cancel,
//! check the balance and manage notification preferences.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Store**: PostgreSQL behind a key-based gateway (sqlx)
//! - **Rules**: pure validation functions over state snapshots
//! - **Notifications**: best-effort dispatch to an external gateway
//!
//! # Startup Flow
//!
//! 1. Load and validate configuration from environment variables
//! 2. Create the database pool and run migrations (schema + fund catalog)
//! 3. Seed the single-tenant user
//! 4. Build the HTTP router and start serving

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod response;
mod services;
mod store;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: db::DbPool,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // The single tenant exists before the first request.
    let user = store::users::ensure_default(&pool, &config).await?;
    tracing::info!(user_id = %user.user_id, "Default user ready");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        // Fund catalog and subscription lifecycle
        .route("/api/funds", get(handlers::funds::list_funds))
        .route("/api/funds/{fund_id}", get(handlers::funds::get_fund))
        .route(
            "/api/funds/{fund_id}/subscribe",
            post(handlers::funds::subscribe),
        )
        .route("/api/funds/{fund_id}/cancel", post(handlers::funds::cancel))
        // User state
        .route("/api/user", get(handlers::user::get_user))
        .route("/api/user/balance", get(handlers::user::get_balance))
        .route("/api/user/funds", get(handlers::user::get_active_funds))
        .route(
            "/api/user/transactions",
            get(handlers::user::get_transactions),
        )
        .route(
            "/api/user/notifications",
            get(handlers::user::get_preferences).put(handlers::user::update_preferences),
        )
        // Request tracing for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
