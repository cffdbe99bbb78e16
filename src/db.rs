//! Database connection pool and migration management.
//!
//! The store behind the gateway is plain PostgreSQL reached through sqlx;
//! this module owns the pool and schema setup, nothing else.

use sqlx::{Pool, Postgres};

/// Type alias for the PostgreSQL connection pool shared across handlers.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// Connections are created lazily and reused across requests. Five
/// connections are plenty for a single-tenant service.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server
/// cannot be reached.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Creates the six record collections and seeds the fund catalog. Each
/// migration runs once; re-running on an up-to-date database is a no-op.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro embeds ./migrations at compile time.
    sqlx::migrate!("./migrations").run(pool).await
}
