//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define data access contracts for tags and posts.
//! - Isolate SQL text and parameter binding from callers.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation.
//! - Multi-statement mutations run in one transaction and roll back on the
//!   first failure.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to store errors.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use thiserror::Error;
use uuid::Uuid;

pub mod post_repo;
pub mod query;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy surfaced to the boundary layer.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error(transparent)]
    Store(DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

/// Coarse error class for mapping onto protocol-level responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Store,
    Connection,
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Store(_) | Self::InvalidData(_) => ErrorKind::Store,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Connection(message) => Self::Connection(message),
            other => Self::Store(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
