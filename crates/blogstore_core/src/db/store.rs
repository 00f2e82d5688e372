//! Process-wide connection provider.
//!
//! # Responsibility
//! - Dial the configured database once and keep the connection for the
//!   lifetime of the application root.
//! - Hand out scoped per-call access (`acquire`) released on drop.
//!
//! # Invariants
//! - A blank connection string never reaches SQLite.
//! - Callers see at most one borrower of the connection at a time.

use super::open::{open_db, open_db_in_memory};
use super::{DbError, DbResult};
use crate::config::StoreConfig;
use log::{error, info, warn};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

const MEMORY_URL: &str = ":memory:";
const URL_SCHEMES: [&str; 2] = ["sqlite://", "sqlite:"];

/// Long-lived store handle owned by the application root.
///
/// Repositories never dial the database themselves; they borrow the
/// connection through [`Store::acquire`].
pub struct Store {
    conn: Mutex<Connection>,
    location: String,
}

impl Store {
    /// Opens the configured database, applying migrations.
    ///
    /// # Errors
    /// - `DbError::Connection` when the url is blank or SQLite cannot open it.
    /// - `DbError::UnsupportedSchemaVersion` when the file was written by a
    ///   newer schema.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let url = config.database_url.trim();
        if url.is_empty() {
            error!("event=store_open module=db status=error error_code=empty_database_url");
            return Err(DbError::Connection("database url is empty".to_string()));
        }

        let location = strip_scheme(url);
        let conn = if location == MEMORY_URL {
            open_db_in_memory()?
        } else {
            open_db(location)?
        };

        info!("event=store_open module=db status=ok location={location}");
        Ok(Self {
            conn: Mutex::new(conn),
            location: location.to_string(),
        })
    }

    /// Convenience constructor for an isolated in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&StoreConfig::new(MEMORY_URL))
    }

    /// Borrows the connection for one unit of work.
    ///
    /// Dropping the returned guard releases it; every exit path of the
    /// caller, including `?` early returns, gives the connection back.
    pub fn acquire(&self) -> StoreConnection<'_> {
        let guard = self.conn.lock().unwrap_or_else(|poisoned| {
            // A panicking holder drops its open transaction, which rolls back.
            warn!("event=store_acquire module=db status=recovered reason=lock_poisoned");
            poisoned.into_inner()
        });
        StoreConnection { guard }
    }

    /// Path (or `:memory:`) this store was opened with.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Releases the underlying connection.
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        match conn.close() {
            Ok(()) => {
                info!(
                    "event=store_close module=db status=ok location={}",
                    self.location
                );
                Ok(())
            }
            Err((_, err)) => {
                error!(
                    "event=store_close module=db status=error location={} error={}",
                    self.location, err
                );
                Err(err.into())
            }
        }
    }
}

/// Scoped connection borrowed from a [`Store`].
pub struct StoreConnection<'store> {
    guard: MutexGuard<'store, Connection>,
}

impl Deref for StoreConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for StoreConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

fn strip_scheme(url: &str) -> &str {
    URL_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or(url)
}
