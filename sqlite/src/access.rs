//! Generic data-access operations.
//!
//! Every operation is generic over an [`Entity`] and builds its statement from
//! the entity's table name and key-field set via
//! [`datatier_core::QueryParts`] or [`datatier_core::select_statement`].
//! Values are always bound as parameters; the literal fragments only appear
//! in debug logs and error messages.
//!
//! The mutation operations execute their statement and discard the
//! affected-row count.

use datatier_core::{QueryParts, Statement, Value, render_predicates, select_statement};
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use tracing::debug;

use crate::context::Context;
use crate::entity::{Entity, Selection};
use crate::error::{Result, SqliteError};

/// Converts a core value into an owned SQLite parameter.
///
/// Date-times are stored as text in [`datatier_core::DATETIME_FORMAT`].
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::DateTime(v) => SqlValue::Text(v.format(datatier_core::DATETIME_FORMAT).to_string()),
    }
}

fn bind(params: &[Value]) -> Vec<SqlValue> {
    params.iter().map(to_sql_value).collect()
}

/// Returns the first row of `T` matching every predicate, or `None`.
pub fn scalar<T: Entity>(ctx: &Context, predicates: &[(&str, Value)]) -> Result<Option<T>> {
    let Statement { sql, params } = select_statement(T::TABLE, predicates);
    debug!(table = T::TABLE, predicates = %render_predicates(predicates), "scalar lookup");

    let mut stmt = ctx.connection().prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind(&params)))?;
    let found = match rows.next()? {
        Some(row) => Some(T::from_row(row)?),
        None => None,
    };
    Ok(found)
}

/// Like [`scalar`], but a missing row is an error.
///
/// Used by accessors of non-nullable parent relationships.
///
/// # Errors
///
/// Returns [`SqliteError::MissingRequiredRelation`] naming the table and the
/// predicates when nothing matches.
pub fn scalar_strict<T: Entity>(ctx: &Context, predicates: &[(&str, Value)]) -> Result<T> {
    scalar(ctx, predicates)?.ok_or_else(|| SqliteError::MissingRequiredRelation {
        table: T::TABLE.to_string(),
        predicates: render_predicates(predicates),
    })
}

/// Prepares a lazy selection of the rows of `T` matching every predicate.
pub fn collection<'c, T: Entity>(
    ctx: &'c Context,
    predicates: &[(&str, Value)],
) -> Result<Selection<'c, T>> {
    let Statement { sql, params } = select_statement(T::TABLE, predicates);
    debug!(table = T::TABLE, predicates = %render_predicates(predicates), "collection lookup");

    let stmt = ctx.connection().prepare(&sql)?;
    Ok(Selection::new(stmt, bind(&params)))
}

fn execute(ctx: &Context, operation: &str, parts: &QueryParts, stmt: Statement) -> Result<()> {
    debug!(
        operation,
        sql = %stmt.sql,
        statements = ?parts.statements(),
        predicates = ?parts.predicates(),
        "executing mutation"
    );
    ctx.connection()
        .execute(&stmt.sql, params_from_iter(bind(&stmt.params)))?;
    Ok(())
}

/// Inserts one row.
pub fn insert<T: Entity>(ctx: &Context, values: &[(&str, Value)]) -> Result<()> {
    let parts = QueryParts::build(T::KEY_FIELDS, values);
    let stmt = parts.insert_statement(T::TABLE);
    execute(ctx, "insert", &parts, stmt)
}

/// Updates the non-key columns of the row identified by the key columns.
///
/// # Errors
///
/// Fails with [`CoreError::NoKeyColumns`](datatier_core::CoreError::NoKeyColumns)
/// rather than updating every row when no key column is supplied.
pub fn update<T: Entity>(ctx: &Context, values: &[(&str, Value)]) -> Result<()> {
    let parts = QueryParts::build(T::KEY_FIELDS, values);
    let stmt = parts.update_statement(T::TABLE)?;
    execute(ctx, "update", &parts, stmt)
}

/// Inserts one row, updating the non-key columns on key conflict.
pub fn upsert<T: Entity>(ctx: &Context, values: &[(&str, Value)]) -> Result<()> {
    let parts = QueryParts::build(T::KEY_FIELDS, values);
    let stmt = parts.upsert_statement(T::TABLE)?;
    execute(ctx, "upsert", &parts, stmt)
}

/// Deletes the row identified by the key columns.
pub fn delete<T: Entity>(ctx: &Context, values: &[(&str, Value)]) -> Result<()> {
    let parts = QueryParts::build(T::KEY_FIELDS, values);
    let stmt = parts.delete_statement(T::TABLE)?;
    execute(ctx, "delete", &parts, stmt)
}
