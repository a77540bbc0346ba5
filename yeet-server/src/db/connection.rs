use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{FEEDBACK_OPTIONS, SCHEMA, TEST_DATA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// An in-memory database lives inside a single connection, so its pool is
    /// capped at one connection that is never recycled.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pool = if Self::is_memory_path(path.as_ref()) {
            let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
            Pool::builder()
                .max_size(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .build(manager)
        } else {
            let manager = SqliteConnectionManager::file(path).with_init(enable_foreign_keys);
            Pool::new(manager)
        }
        .context("Failed to create database connection pool")?;

        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy()
            .trim()
            .eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema and the predefined feedback reasons.
    /// Safe to run on every start.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        drop(conn);
        self.seed_feedback_options()
    }

    /// Insert the predefined feedback reasons, skipping any already present
    pub fn seed_feedback_options(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(FEEDBACK_OPTIONS)
            .context("Failed to seed feedback options")?;
        Ok(())
    }

    /// Seed the database with demo users, posts and relationships
    pub fn seed_test_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(TEST_DATA)
            .context("Failed to seed test data")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}

fn enable_foreign_keys(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}
