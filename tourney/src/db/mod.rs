//! Database module providing SQLite connection pooling and the tournament store.
//!
//! This module owns the connection pool, the schema, the row codec and the
//! repositories the hosts persist through.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub mod codec;
pub mod config;
pub mod errors;
pub mod repository;

pub use codec::{Decoded, TournamentRecord};
pub use config::{DatabaseConfig, parse_env_or};
pub use errors::{StorageError, StorageResult};
pub use repository::{RatingRepository, SqliteTournamentRepository, TournamentRepository};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tournaments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        owner_id TEXT,
        capacity INTEGER DEFAULT 16,
        group_size INTEGER DEFAULT 1,
        status TEXT DEFAULT 'open',
        players TEXT DEFAULT '[]',
        matches TEXT DEFAULT '[]',
        player_groups TEXT DEFAULT '[]',
        created_at INTEGER DEFAULT (strftime('%s', 'now'))
    )",
    "CREATE TABLE IF NOT EXISTS ratings (
        user_id TEXT PRIMARY KEY,
        rating REAL NOT NULL DEFAULT 1200
    )",
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tourney::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     db.init_schema().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(config.create_if_missing);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs));

        // An in-memory database lives only as long as its connection
        if config.is_in_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository over this pool
    pub fn repository(&self) -> SqliteTournamentRepository {
        SqliteTournamentRepository::new(self.pool.clone())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
