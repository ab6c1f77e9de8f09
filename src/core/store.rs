//! SQLite-backed storage
//!
//! The store owns a connection pool and hands out one transaction per public
//! operation. Nothing holds a connection between calls: every scope acquires
//! a pooled connection, begins a transaction, and either commits or rolls
//! back before the connection goes back to the pool.
//!
//! Write scopes use `BEGIN IMMEDIATE`, so the database write lock is held
//! from the first read of a mutating operation until its commit. Eligibility
//! reads and the writes that depend on them cannot interleave with another
//! writer.

use crate::types::LibraryError;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, TransactionBehavior};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Default database file
pub const DEFAULT_DATABASE: &str = "library.db";

/// Default number of pooled connections for file databases
pub const DEFAULT_POOL_SIZE: u32 = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_init.sql",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/0001_init.sql")),
    ),
    (
        "0002_loan_indexes.sql",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/migrations/0002_loan_indexes.sql"
        )),
    ),
];

/// Storage configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file; `None` selects a private in-memory database
    pub path: Option<PathBuf>,
    /// Maximum number of pooled connections
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_DATABASE)),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl StoreConfig {
    /// Create a file-backed configuration
    ///
    /// A pool size of zero falls back to the default with a warning.
    pub fn new(path: impl Into<PathBuf>, pool_size: u32) -> Self {
        let pool_size = if pool_size == 0 {
            warn!(
                pool_size,
                default = DEFAULT_POOL_SIZE,
                "invalid pool size, using default"
            );
            DEFAULT_POOL_SIZE
        } else {
            pool_size
        };

        Self {
            path: Some(path.into()),
            pool_size,
        }
    }

    /// In-memory database served by a single connection
    ///
    /// Each in-memory SQLite connection is its own database, so the pool is
    /// pinned to one connection that never expires.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            pool_size: 1,
        }
    }
}

/// Handle to the circulation database
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    /// Open (or create) the database and bring its schema up to date
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the pool cannot be built or a migration fails.
    pub fn open(config: &StoreConfig) -> Result<Self, LibraryError> {
        let manager = match &config.path {
            Some(path) => SqliteConnectionManager::file(path),
            None => SqliteConnectionManager::memory(),
        }
        .with_init(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(BUSY_TIMEOUT)
        });

        let builder = Pool::builder().max_size(config.pool_size.max(1));
        let builder = if config.path.is_none() {
            builder.max_size(1).max_lifetime(None).idle_timeout(None)
        } else {
            builder
        };
        let pool = builder.build(manager)?;

        {
            let conn = pool.get()?;
            apply_migrations(&conn)?;
        }
        debug!(path = ?config.path, pool_size = config.pool_size, "store opened");

        Ok(Self { pool })
    }

    /// Run a read-only unit of work in a deferred transaction
    pub fn read<T, F>(&self, work: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Connection) -> Result<T, LibraryError>,
    {
        self.run(TransactionBehavior::Deferred, work)
    }

    /// Run a mutating unit of work in an immediate transaction
    ///
    /// Commits when `work` succeeds; rolls back and returns its error
    /// otherwise. No partial writes survive a failure.
    pub fn write<T, F>(&self, work: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Connection) -> Result<T, LibraryError>,
    {
        self.run(TransactionBehavior::Immediate, work)
    }

    fn run<T, F>(&self, behavior: TransactionBehavior, work: F) -> Result<T, LibraryError>
    where
        F: FnOnce(&Connection) -> Result<T, LibraryError>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(behavior)?;

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(%rollback, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

fn apply_migrations(conn: &Connection) -> Result<(), LibraryError> {
    for (name, sql) in MIGRATIONS {
        conn.execute_batch(sql).map_err(|e| LibraryError::Storage {
            message: format!("failed to apply migration {}: {}", name, e),
        })?;
        debug!(migration = name, "migration applied");
    }
    Ok(())
}
