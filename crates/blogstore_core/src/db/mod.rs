//! SQLite storage bootstrap, connection provider and schema migrations.
//!
//! # Responsibility
//! - Open and configure the SQLite connection backing the blog store.
//! - Own the single long-lived connection handed out per call.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - An empty connection string is a hard `Connection` failure.

use thiserror::Error;

pub mod migrations;
mod open;
mod store;

pub(crate) use open::CASEFOLD_FN;
pub use open::{open_db, open_db_in_memory};
pub use store::{Store, StoreConnection};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// Store unreachable or misconfigured.
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
