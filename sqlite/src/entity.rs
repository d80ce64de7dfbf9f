//! The contract every generated data-access type implements.

use std::marker::PhantomData;

use datatier_core::Value;
use rusqlite::{Row, Rows, params_from_iter};
use rusqlite::types::Value as SqlValue;

use crate::access;
use crate::context::Context;
use crate::error::Result;

/// A generated data-access type bound to one table.
///
/// `from_row` reads columns positionally, in declaration order, from a
/// `SELECT *` row. The read operations are provided; the mutation operations
/// live in [`access`](crate::access) and are forwarded to by the generated
/// `insert`, `update`, `add_update` and `delete` methods.
pub trait Entity: Sized {
    /// Normalized table name.
    const TABLE: &'static str;
    /// Ordered primary-key column names.
    const KEY_FIELDS: &'static [&'static str];

    /// Materializes one instance from a positional result row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Ordered `(column, value)` pairs of this instance.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// First row matching every predicate, if any.
    fn scalar(ctx: &Context, predicates: &[(&str, Value)]) -> Result<Option<Self>> {
        access::scalar(ctx, predicates)
    }

    /// First row matching every predicate; a missing row is an error.
    fn scalar_strict(ctx: &Context, predicates: &[(&str, Value)]) -> Result<Self> {
        access::scalar_strict(ctx, predicates)
    }

    /// Lazily materialized rows matching every predicate.
    fn collection<'c>(ctx: &'c Context, predicates: &[(&str, Value)]) -> Result<Selection<'c, Self>> {
        access::collection(ctx, predicates)
    }
}

/// A prepared `SELECT` whose rows are materialized on demand.
///
/// # Examples
///
/// ```no_run
/// # use datatier_sqlite::{Context, Entity, Value};
/// # fn demo<T: Entity + std::fmt::Debug>(ctx: &Context) -> datatier_sqlite::Result<()> {
/// let mut selection = T::collection(ctx, &[("ArtistId", Value::from(1_i64))])?;
/// for item in selection.rows()? {
///     println!("{:?}", item?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Selection<'c, T> {
    stmt: rusqlite::Statement<'c>,
    params: Vec<SqlValue>,
    _marker: PhantomData<T>,
}

impl<'c, T: Entity> Selection<'c, T> {
    pub(crate) fn new(stmt: rusqlite::Statement<'c>, params: Vec<SqlValue>) -> Self {
        Self {
            stmt,
            params,
            _marker: PhantomData,
        }
    }

    /// Executes the query and returns a forward-only iterator over its rows.
    ///
    /// Each call runs the query again from the start.
    pub fn rows(&mut self) -> Result<RowIter<'_, T>> {
        let rows = self.stmt.query(params_from_iter(self.params.iter()))?;
        Ok(RowIter {
            rows,
            finished: false,
            _marker: PhantomData,
        })
    }

    /// Materializes every row.
    pub fn collect_all(mut self) -> Result<Vec<T>> {
        let items = self.rows()?.collect::<Result<Vec<T>>>()?;
        Ok(items)
    }
}

/// Iterator over the rows of a [`Selection`].
///
/// Yields at most one error, after which it is exhausted.
pub struct RowIter<'s, T> {
    rows: Rows<'s>,
    finished: bool,
    _marker: PhantomData<T>,
}

impl<T: Entity> Iterator for RowIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.rows.next() {
            Ok(Some(row)) => Some(T::from_row(row).map_err(Into::into)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e.into()))
            }
        }
    }
}
