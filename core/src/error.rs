//! Error types for schema mapping and statement construction.

use thiserror::Error;

/// Errors raised by the pure parts of the generator and runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A declared column type has no host type mapping.
    #[error("unsupported column type '{declared_type}'")]
    UnsupportedType { declared_type: String },

    /// A keyed mutation was requested for a row without key columns.
    #[error("cannot {operation} table '{table}': no key columns in the supplied values")]
    NoKeyColumns {
        table: String,
        operation: &'static str,
    },

    /// An update was requested but every supplied column is a key column.
    #[error("cannot update table '{table}': no non-key columns to set")]
    NothingToUpdate { table: String },
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
