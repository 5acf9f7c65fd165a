//! SQLite pool construction
//!
//! WAL keeps readers unblocked while a writer (insert or purge) holds the write lock,
//! and the busy timeout makes concurrent writers queue instead of failing.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

const BUSY_TIMEOUT_SECS: u64 = 10;

/// Embedded schema migrations (workspace `migrations/`)
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Open a connection pool, creating the database file if needed
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
}

/// Apply pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
