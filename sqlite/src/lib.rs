//! SQLite introspection and data-access runtime.
//!
//! This crate is used twice: by the generator, to read a database schema,
//! and by the generated code, at its own run time, for every read and write.
//!
//! # Architecture
//!
//! - **`introspect`**: [`Introspector`] runs the foreign-key and column
//!   metadata queries and assembles a [`Schema`](datatier_core::Schema).
//! - **`context`**: [`Context`], the explicit connection owner passed to
//!   every generated method.
//! - **`entity`**: the [`Entity`] trait generated types implement, and the
//!   lazy [`Selection`] returned by collection lookups.
//! - **`access`**: generic `scalar`, `scalar_strict`, `collection`,
//!   `insert`, `update`, `upsert` and `delete`.
//! - **`registry`**: [`Registry`], table-name keyed lookup of generated
//!   types.
//!
//! # Quick start: generated types
//!
//! ```no_run
//! use datatier_sqlite::{Context, Entity, Value};
//! # #[derive(Debug)] struct Albums;
//! # impl Entity for Albums {
//! #     const TABLE: &'static str = "Albums";
//! #     const KEY_FIELDS: &'static [&'static str] = &["AlbumId"];
//! #     fn from_row(_: &datatier_sqlite::Row<'_>) -> rusqlite::Result<Self> { Ok(Albums) }
//! #     fn values(&self) -> Vec<(&'static str, Value)> { Vec::new() }
//! # }
//!
//! let ctx = Context::open("chinook.db").unwrap();
//! let mut albums = Albums::collection(&ctx, &[("ArtistId", Value::from(1_i64))]).unwrap();
//! for album in albums.rows().unwrap() {
//!     println!("{:?}", album.unwrap());
//! }
//! ```

pub mod access;
mod context;
mod entity;
mod error;
mod introspect;
mod registry;

pub use access::{collection, delete, insert, scalar, scalar_strict, update, upsert};
pub use context::{Context, ensure_ready};
pub use entity::{Entity, RowIter, Selection};
pub use error::{Result, SqliteError};
pub use introspect::{COLUMN_METADATA_SQL, FOREIGN_KEY_METADATA_SQL, Introspector};
pub use registry::{EntityDescriptor, Record, Registry};

pub use datatier_core::Value;
pub use rusqlite::Row;

// Re-exported so generated code depends on this crate alone.
pub use chrono;
pub use rusqlite;
