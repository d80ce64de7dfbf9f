//! Error types for introspection and data access.
//!
//! Provides a unified error type covering database access, connection
//! readiness, missing required relations and statement construction.

use datatier_core::CoreError;
use thiserror::Error;

/// Errors that can occur while introspecting or accessing a SQLite database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The schema source could not be opened or does not answer queries.
    #[error("connection not ready: {0}")]
    ConnectionNotReady(String),

    /// A non-nullable relationship lookup matched no row.
    #[error("required related row missing in '{table}' where {predicates}")]
    MissingRequiredRelation { table: String, predicates: String },

    /// Statement construction rejected the supplied values.
    #[error(transparent)]
    QueryError(#[from] CoreError),

    /// No entity is registered under the requested table name.
    #[error("no entity registered for table '{0}'")]
    UnknownTable(String),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
