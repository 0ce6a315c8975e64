use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::sync::Arc;

use super::repositories::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, UserRepository,
};
use super::schema::{DEMO_DATA, SCHEMA, TABLES};
use crate::clock::{SharedClock, SystemClock};
use crate::config::{DatabaseSettings, DEFAULT_POOL_SIZE};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Store handle: a connection pool plus the clock that stamps `created_at`.
///
/// Cloning is cheap; every repository receives its own clone of both.
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
    clock: SharedClock,
}

impl Database {
    /// Open (or create) a database with the default pool size and the system clock
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options(path, DEFAULT_POOL_SIZE, Arc::new(SystemClock))
    }

    /// Open a database with an explicit pool size and clock
    ///
    /// # Arguments
    /// * `path` - Database file path or ":memory:" for in-memory database
    /// * `pool_size` - Maximum pooled connections for file databases
    /// * `clock` - Source of `created_at` values
    pub fn with_options<P: AsRef<Path>>(path: P, pool_size: u32, clock: SharedClock) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let in_memory = path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH);

        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        // Every in-memory connection is its own database, so share exactly one
        let max_size = if in_memory { 1 } else { pool_size.max(1) };

        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .context("Failed to create database connection pool")?;

        tracing::debug!(path = %path_str, max_size, "Opened database pool");
        Ok(Self { pool, clock })
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// In-memory database whose timestamps come from `clock`
    pub fn in_memory_with_clock(clock: SharedClock) -> Result<Self> {
        Self::with_options(MEMORY_DB_PATH, 1, clock)
    }

    /// Open the database described by loaded settings, creating the schema
    /// and loading demo data when configured to
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        let db = Self::with_options(&settings.path, settings.pool_size, Arc::new(SystemClock))?;
        db.initialize()?;
        if settings.seed_demo_data {
            db.seed_demo_data()?;
        }
        Ok(db)
    }

    /// Initialize the database schema. Safe to run against an existing database.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        tracing::info!("Database schema initialized");
        Ok(())
    }

    /// Seed the database with demo users, posts and relationships
    pub fn seed_demo_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DEMO_DATA)
            .context("Failed to seed demo data")?;
        tracing::info!("Demo data seeded");
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }

    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    /// Row count of every Snapfeed table, in dependency order
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let conn = self.connection()?;
        TABLES
            .iter()
            .map(|table| -> Result<(&'static str, i64)> {
                let count: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                    .with_context(|| format!("Failed to count rows in {}", table))?;
                Ok((*table, count))
            })
            .collect()
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone(), self.clock.clone())
    }

    pub fn posts(&self) -> PostRepository {
        PostRepository::new(self.pool.clone(), self.clock.clone())
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.pool.clone(), self.clock.clone())
    }

    pub fn likes(&self) -> LikeRepository {
        LikeRepository::new(self.pool.clone(), self.clock.clone())
    }

    pub fn follows(&self) -> FollowRepository {
        FollowRepository::new(self.pool.clone(), self.clock.clone())
    }
}
