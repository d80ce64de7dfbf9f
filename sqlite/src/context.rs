//! Explicit connection context for generated types.
//!
//! Every generated accessor and mutation takes a [`Context`] argument; there
//! is no process-wide connection. The context is acquired once and released
//! with [`Context::close`] (or on drop).

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Result, SqliteError};

/// Owner of the SQLite connection used by the data-access runtime.
///
/// # Examples
///
/// ```
/// use datatier_sqlite::Context;
///
/// let ctx = Context::open_in_memory().unwrap();
/// ctx.connection()
///     .execute_batch("CREATE TABLE Artists (Id INTEGER PRIMARY KEY, Name TEXT);")
///     .unwrap();
/// ctx.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Context {
    conn: Connection,
}

impl Context {
    /// Wraps an already opened connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::ConnectionNotReady`] if the connection does not
    /// answer a trivial schema query.
    pub fn new(conn: Connection) -> Result<Self> {
        ensure_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            SqliteError::ConnectionNotReady(format!("failed to open '{}': {e}", path.display()))
        })?;
        Self::new(conn)
    }

    /// Opens an existing database file without write access.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            SqliteError::ConnectionNotReady(format!("failed to open '{}': {e}", path.display()))
        })?;
        Self::new(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SqliteError::ConnectionNotReady(e.to_string()))?;
        Self::new(conn)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error SQLite raises while doing so.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| SqliteError::DatabaseError(e))
    }
}

/// Checks that `conn` can answer queries.
///
/// # Errors
///
/// Returns [`SqliteError::ConnectionNotReady`] with the SQLite message.
pub fn ensure_ready(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(|e| SqliteError::ConnectionNotReady(e.to_string()))
}
