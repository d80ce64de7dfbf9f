//! Schema introspection through SQLite metadata queries.
//!
//! Two queries drive introspection, foreign keys first and columns second.
//! Each row is handed to [`SchemaBuilder`], which normalizes names, merges
//! multi-column constraints and resolves foreign-key nullability.
//!
//! # Example
//!
//! ```
//! use datatier_sqlite::Introspector;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(
//!     "CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE child (id INTEGER PRIMARY KEY, parentId INTEGER REFERENCES parent(id));",
//! )
//! .unwrap();
//!
//! let schema = Introspector::new(&conn).run().unwrap();
//! assert_eq!(schema.tables.len(), 2);
//! assert!(schema.foreign_keys[0].is_nullable);
//! ```

use datatier_core::{ColumnRow, DEFAULT_RESERVED_PREFIX, ForeignKeyRow, Schema, SchemaBuilder};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::context::ensure_ready;
use crate::error::Result;

/// Foreign-key metadata: source table, constraint id, sequence, target table,
/// source column, target column. Positions are a fixed contract with
/// [`Introspector::run`].
pub const FOREIGN_KEY_METADATA_SQL: &str = r#"
SELECT m.name, f.id, f.seq, f."table", f."from", f."to"
FROM sqlite_master AS m
JOIN pragma_foreign_key_list(m.name) AS f
WHERE m.type = 'table'
ORDER BY m.name, f.id, f.seq
"#;

/// Column metadata: table, column id, column name, declared type, not-null
/// flag, primary-key ordinal. Ordered by table then declaration order.
pub const COLUMN_METADATA_SQL: &str = r#"
SELECT m.name, p.cid, p.name, p.type, p."notnull", p.pk
FROM sqlite_master AS m
JOIN pragma_table_info(m.name) AS p
WHERE m.type = 'table'
ORDER BY m.name, p.cid
"#;

/// Reads the schema of a SQLite database into a [`Schema`].
pub struct Introspector<'a> {
    conn: &'a Connection,
    reserved_prefix: String,
}

impl<'a> Introspector<'a> {
    /// Creates an introspector skipping tables that contain `sqlite_`.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
        }
    }

    /// Overrides the reserved table-name prefix.
    pub fn reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// Runs both metadata queries and assembles the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ConnectionNotReady`](crate::SqliteError::ConnectionNotReady)
    /// if the connection does not answer queries, or
    /// [`SqliteError::DatabaseError`](crate::SqliteError::DatabaseError) if a
    /// metadata query fails. Nothing is returned on partial failure.
    pub fn run(self) -> Result<Schema> {
        ensure_ready(self.conn)?;
        let mut builder = SchemaBuilder::new(self.reserved_prefix);

        let mut stmt = self.conn.prepare(FOREIGN_KEY_METADATA_SQL)?;
        let fk_rows = stmt.query_map([], |row| {
            Ok(ForeignKeyRow {
                source_table: row.get(0)?,
                constraint_ordinal: row.get(1)?,
                target_table: row.get(3)?,
                source_column: row.get(4)?,
                target_column: row.get(5)?,
            })
        })?;
        let mut fk_row_count = 0usize;
        for row in fk_rows {
            builder.add_foreign_key_row(row?);
            fk_row_count += 1;
        }
        debug!(rows = fk_row_count, "read foreign-key metadata");

        let mut stmt = self.conn.prepare(COLUMN_METADATA_SQL)?;
        let column_rows = stmt.query_map([], |row| {
            Ok(ColumnRow {
                table: row.get(0)?,
                ordinal: row.get(1)?,
                name: row.get(2)?,
                declared_type: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                not_null: row.get(4)?,
                pk_ordinal: row.get(5)?,
            })
        })?;
        let mut column_row_count = 0usize;
        for row in column_rows {
            builder.add_column_row(row?);
            column_row_count += 1;
        }
        debug!(rows = column_row_count, "read column metadata");

        let schema = builder.finish();
        info!(
            tables = schema.tables.len(),
            foreign_keys = schema.foreign_keys.len(),
            "introspected schema"
        );
        Ok(schema)
    }
}
