//! Error types for code generation.
//!
//! Every failure is fatal for the whole run: units are emitted in memory
//! first, so an error here never leaves a partially written output directory.

use datatier_sqlite::SqliteError;
use thiserror::Error;

/// Errors that can occur while generating data-access units.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A column's declared type has no mapping.
    #[error("unsupported type '{declared_type}' for column '{table}.{column}'")]
    UnsupportedColumnType {
        table: String,
        column: String,
        declared_type: String,
    },

    /// A schema name cannot be turned into a usable Rust identifier.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Emitted tokens did not parse as a Rust source file.
    #[error("generated source for '{file}' does not parse: {message}")]
    InvalidSource { file: String, message: String },

    /// Reading the schema source failed.
    #[error("introspection failed: {0}")]
    Introspection(#[from] SqliteError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;
