//! Typed data-access code generation for SQLite schemas.
//!
//! Reads a database schema through [`datatier_sqlite::Introspector`] and
//! emits one Rust source file per table. Each generated type implements
//! [`datatier_sqlite::Entity`] and carries relationship accessors derived
//! from the foreign keys plus `insert`, `update`, `add_update` and `delete`.
//!
//! # Architecture
//!
//! - **`naming`**: table and column names to Rust identifiers (`heck`).
//! - **`emitter`**: [`emit_unit`], [`emit_all`] and [`emit_module_index`]
//!   build token streams with `quote`.
//! - **`format`**: validates emitted tokens with `syn` and formats them with
//!   `rustfmt` when available.
//! - **`sink`**: [`OutputSink`], the output directory.
//! - **`config`**: [`GeneratorConfig`], loaded from YAML.
//! - **`generator`**: [`Generator`], the introspect → emit → write pipeline.
//!
//! # Quick start
//!
//! ```
//! use datatier_codegen::{Generator, GeneratorConfig};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(
//!     "CREATE TABLE Parent (Id INTEGER PRIMARY KEY NOT NULL, Name TEXT);
//!      CREATE TABLE Child (Id INTEGER PRIMARY KEY NOT NULL, ParentId INTEGER REFERENCES Parent(Id));",
//! )
//! .unwrap();
//!
//! let config = GeneratorConfig { format: false, ..GeneratorConfig::default() };
//! let generation = Generator::new(config).generate(&conn).unwrap();
//! assert_eq!(generation.units.len(), 2);
//! assert!(generation.units[0].source.contains("fk_parent"));
//! ```

mod config;
mod emitter;
mod error;
mod format;
mod generator;
pub mod naming;
mod sink;

pub use config::GeneratorConfig;
pub use emitter::{
    EmitOptions, GeneratedUnit, MODULE_INDEX_FILE, ModuleIndex, emit_all, emit_module_index,
    emit_unit,
};
pub use error::{CodegenError, Result};
pub use format::{GENERATED_MARKER, render_source};
pub use generator::{Generation, Generator};
pub use sink::OutputSink;
