//! Core model and pure logic for SQLite data-tier generation.
//!
//! This crate holds everything that does not touch a database connection:
//!
//! - [`Schema`], [`TableDefinition`], [`ColumnDefinition`], [`ForeignKey`]:
//!   the introspected schema model.
//! - [`SchemaBuilder`]: assembles the model from raw introspection rows,
//!   merging multi-column foreign keys and resolving their nullability.
//! - [`map_type`]: the declared-type to host-type rule table.
//! - [`QueryParts`] and [`select_statement`]: key/non-key partitioning and
//!   parameterized statement construction used by the runtime.
//! - [`Value`]: the column value passed between generated types and the
//!   runtime.
//!
//! # Example
//!
//! ```
//! use datatier_core::*;
//!
//! let parts = QueryParts::build(
//!     &["Id"],
//!     &[("Id", Value::from(1_i64)), ("Title", Value::from("Balls to the Wall"))],
//! );
//! let stmt = parts.update_statement("Albums").unwrap();
//! assert_eq!(stmt.sql, "UPDATE \"Albums\" SET \"Title\" = ?1 WHERE \"Id\" = ?2");
//! ```

mod builder;
mod error;
mod model;
mod names;
mod query_parts;
mod type_map;
mod value;

pub use builder::{ColumnRow, DEFAULT_RESERVED_PREFIX, ForeignKeyRow, SchemaBuilder};
pub use error::{CoreError, Result};
pub use model::{ColumnDefinition, ForeignKey, ForeignKeyPredicate, Schema, TableDefinition};
pub use names::{contains_ignore_case, normalize_identifier, quote_identifier};
pub use query_parts::{QueryParts, Statement, render_predicates, select_statement};
pub use type_map::{DeclarationDefault, HostType, ReaderKind, TypeMapping, map_type};
pub use value::{DATETIME_FORMAT, Value};
