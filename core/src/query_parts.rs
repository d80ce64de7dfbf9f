//! Key/non-key partitioning and statement construction for mutations.
//!
//! [`QueryParts`] splits one row's ordered `(column, value)` pairs by
//! membership in the table's key-field set. It keeps the literal fragments
//! (`Name = "Ann"`) for diagnostics and builds the parameterized statements
//! the runtime executes.

use crate::error::{CoreError, Result};
use crate::names::quote_identifier;
use crate::value::Value;

/// SQL text with numbered placeholders and its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds `SELECT * FROM "table" [WHERE "c1" = ?1 AND ...]`.
///
/// # Examples
///
/// ```
/// use datatier_core::{select_statement, Value};
///
/// let stmt = select_statement("Albums", &[("ArtistId", Value::from(3_i64))]);
/// assert_eq!(stmt.sql, "SELECT * FROM \"Albums\" WHERE \"ArtistId\" = ?1");
/// assert_eq!(stmt.params, vec![Value::Integer(3)]);
///
/// let all = select_statement("Albums", &[]);
/// assert_eq!(all.sql, "SELECT * FROM \"Albums\"");
/// ```
pub fn select_statement(table: &str, predicates: &[(&str, Value)]) -> Statement {
    let mut sql = format!("SELECT * FROM {}", quote_identifier(table));
    if !predicates.is_empty() {
        let conditions: Vec<String> = predicates
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", quote_identifier(column), i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    Statement {
        sql,
        params: predicates.iter().map(|(_, v)| v.clone()).collect(),
    }
}

/// Renders `column = literal` pairs for diagnostics, e.g. `ArtistId = 3`.
pub fn render_predicates(predicates: &[(&str, Value)]) -> String {
    predicates
        .iter()
        .map(|(column, value)| format!("{column} = {value}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Partition of one row's column/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParts {
    all_columns: Vec<String>,
    key_columns: Vec<String>,
    non_key_columns: Vec<String>,
    values: Vec<String>,
    statements: Vec<String>,
    predicates: Vec<String>,
    params: Vec<Value>,
    is_key: Vec<bool>,
}

impl QueryParts {
    /// Partitions `pairs` by case-insensitive membership in `key_fields`.
    ///
    /// Input order is preserved within each group.
    ///
    /// # Examples
    ///
    /// ```
    /// use datatier_core::{QueryParts, Value};
    ///
    /// let parts = QueryParts::build(
    ///     &["id"],
    ///     &[("Id", Value::from(1_i64)), ("Name", Value::from("Ann"))],
    /// );
    /// assert_eq!(parts.all_columns(), ["Id", "Name"]);
    /// assert_eq!(parts.key_columns(), ["Id"]);
    /// assert_eq!(parts.non_key_columns(), ["Name"]);
    /// assert_eq!(parts.predicates(), ["Id = 1"]);
    /// assert_eq!(parts.statements(), ["Name = \"Ann\""]);
    /// ```
    pub fn build(key_fields: &[&str], pairs: &[(&str, Value)]) -> Self {
        let keys: Vec<String> = key_fields.iter().map(|k| k.to_lowercase()).collect();

        let mut parts = QueryParts {
            all_columns: Vec::with_capacity(pairs.len()),
            key_columns: Vec::new(),
            non_key_columns: Vec::new(),
            values: Vec::with_capacity(pairs.len()),
            statements: Vec::new(),
            predicates: Vec::new(),
            params: Vec::with_capacity(pairs.len()),
            is_key: Vec::with_capacity(pairs.len()),
        };

        for (column, value) in pairs {
            let is_key = keys.contains(&column.to_lowercase());
            let rendered = value.to_string();
            let fragment = format!("{column} = {rendered}");

            parts.all_columns.push(column.to_string());
            if is_key {
                parts.key_columns.push(column.to_string());
                parts.predicates.push(fragment);
            } else {
                parts.non_key_columns.push(column.to_string());
                parts.statements.push(fragment);
            }
            parts.values.push(rendered);
            parts.params.push(value.clone());
            parts.is_key.push(is_key);
        }

        parts
    }

    pub fn all_columns(&self) -> &[String] {
        &self.all_columns
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn non_key_columns(&self) -> &[String] {
        &self.non_key_columns
    }

    /// Literal rendering of every value, in input order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `column = literal` fragments for non-key columns.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// `column = literal` fragments for key columns.
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Ordered `(column, value, is_key)` triples of the input.
    fn entries(&self) -> impl Iterator<Item = (&str, &Value, bool)> {
        self.all_columns
            .iter()
            .zip(&self.params)
            .zip(&self.is_key)
            .map(|((c, v), k)| (c.as_str(), v, *k))
    }

    fn require_keys(&self, table: &str, operation: &'static str) -> Result<()> {
        if self.key_columns.is_empty() {
            return Err(CoreError::NoKeyColumns {
                table: table.to_string(),
                operation,
            });
        }
        Ok(())
    }

    fn quoted_columns(columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `INSERT INTO "T" ("a", "b") VALUES (?1, ?2)`.
    pub fn insert_statement(&self, table: &str) -> Statement {
        let placeholders: Vec<String> = (1..=self.params.len()).map(|i| format!("?{i}")).collect();
        Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_identifier(table),
                Self::quoted_columns(&self.all_columns),
                placeholders.join(", ")
            ),
            params: self.params.clone(),
        }
    }

    /// `UPDATE "T" SET non-key = ?.. WHERE key = ?..`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoKeyColumns`] without key columns and
    /// [`CoreError::NothingToUpdate`] without non-key columns.
    pub fn update_statement(&self, table: &str) -> Result<Statement> {
        self.require_keys(table, "update")?;
        if self.non_key_columns.is_empty() {
            return Err(CoreError::NothingToUpdate {
                table: table.to_string(),
            });
        }

        let mut params = Vec::with_capacity(self.params.len());
        let mut sets = Vec::new();
        for (column, value, _) in self.entries().filter(|(_, _, k)| !k) {
            params.push(value.clone());
            sets.push(format!("{} = ?{}", quote_identifier(column), params.len()));
        }
        let mut conditions = Vec::new();
        for (column, value, _) in self.entries().filter(|(_, _, k)| *k) {
            params.push(value.clone());
            conditions.push(format!("{} = ?{}", quote_identifier(column), params.len()));
        }

        Ok(Statement {
            sql: format!(
                "UPDATE {} SET {} WHERE {}",
                quote_identifier(table),
                sets.join(", "),
                conditions.join(" AND ")
            ),
            params,
        })
    }

    /// Insert followed by `ON CONFLICT(keys) DO UPDATE SET non-key = ?i`.
    ///
    /// Each SET clause reuses the placeholder bound for that column in the
    /// VALUES list. When every column is a key the conflict action is
    /// `DO NOTHING`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoKeyColumns`] without key columns.
    pub fn upsert_statement(&self, table: &str) -> Result<Statement> {
        self.require_keys(table, "upsert")?;
        let mut stmt = self.insert_statement(table);

        let sets: Vec<String> = self
            .entries()
            .enumerate()
            .filter(|(_, (_, _, k))| !k)
            .map(|(i, (column, _, _))| format!("{} = ?{}", quote_identifier(column), i + 1))
            .collect();

        stmt.sql.push_str(&format!(
            " ON CONFLICT({}) ",
            Self::quoted_columns(&self.key_columns)
        ));
        if sets.is_empty() {
            stmt.sql.push_str("DO NOTHING");
        } else {
            stmt.sql.push_str("DO UPDATE SET ");
            stmt.sql.push_str(&sets.join(", "));
        }
        Ok(stmt)
    }

    /// `DELETE FROM "T" WHERE key = ?..`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoKeyColumns`] without key columns.
    pub fn delete_statement(&self, table: &str) -> Result<Statement> {
        self.require_keys(table, "delete")?;

        let mut params = Vec::with_capacity(self.key_columns.len());
        let mut conditions = Vec::new();
        for (column, value, _) in self.entries().filter(|(_, _, k)| *k) {
            params.push(value.clone());
            conditions.push(format!("{} = ?{}", quote_identifier(column), params.len()));
        }

        Ok(Statement {
            sql: format!(
                "DELETE FROM {} WHERE {}",
                quote_identifier(table),
                conditions.join(" AND ")
            ),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Vec<(&'static str, Value)> {
        vec![
            ("Name", Value::from("Ann")),
            ("ID", Value::from(7_i64)),
            ("Score", Value::from(None::<f64>)),
        ]
    }

    #[test]
    fn test_partition_is_case_insensitive_and_order_preserving() {
        let parts = QueryParts::build(&["Id"], &row());
        assert_eq!(parts.all_columns(), ["Name", "ID", "Score"]);
        assert_eq!(parts.key_columns(), ["ID"]);
        assert_eq!(parts.non_key_columns(), ["Name", "Score"]);
        assert_eq!(parts.values(), ["\"Ann\"", "7", "NULL"]);
        assert_eq!(parts.statements(), ["Name = \"Ann\"", "Score = NULL"]);
        assert_eq!(parts.predicates(), ["ID = 7"]);
    }

    #[test]
    fn test_insert_binds_every_value_in_order() {
        let stmt = QueryParts::build(&["id"], &row()).insert_statement("People");
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"People\" (\"Name\", \"ID\", \"Score\") VALUES (?1, ?2, ?3)"
        );
        assert_eq!(
            stmt.params,
            vec![Value::from("Ann"), Value::Integer(7), Value::Null]
        );
    }

    #[test]
    fn test_update_sets_non_keys_then_filters_on_keys() {
        let stmt = QueryParts::build(&["id"], &row())
            .update_statement("People")
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"People\" SET \"Name\" = ?1, \"Score\" = ?2 WHERE \"ID\" = ?3"
        );
        assert_eq!(
            stmt.params,
            vec![Value::from("Ann"), Value::Null, Value::Integer(7)]
        );
    }

    #[test]
    fn test_upsert_reuses_insert_placeholders() {
        let stmt = QueryParts::build(&["id"], &row())
            .upsert_statement("People")
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"People\" (\"Name\", \"ID\", \"Score\") VALUES (?1, ?2, ?3) \
             ON CONFLICT(\"ID\") DO UPDATE SET \"Name\" = ?1, \"Score\" = ?3"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_upsert_of_key_only_row_does_nothing_on_conflict() {
        let pairs = [("A", Value::from(1_i64)), ("B", Value::from(2_i64))];
        let stmt = QueryParts::build(&["a", "b"], &pairs)
            .upsert_statement("Link")
            .unwrap();
        assert!(stmt.sql.ends_with("ON CONFLICT(\"A\", \"B\") DO NOTHING"));
    }

    #[test]
    fn test_delete_binds_only_keys() {
        let stmt = QueryParts::build(&["id"], &row())
            .delete_statement("People")
            .unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"People\" WHERE \"ID\" = ?1");
        assert_eq!(stmt.params, vec![Value::Integer(7)]);
    }

    #[test]
    fn test_keyed_mutations_without_keys_fail_fast() {
        let parts = QueryParts::build(&[], &row());
        for result in [
            parts.update_statement("People"),
            parts.upsert_statement("People"),
            parts.delete_statement("People"),
        ] {
            assert!(matches!(result, Err(CoreError::NoKeyColumns { .. })));
        }
    }

    #[test]
    fn test_update_without_non_keys_fails() {
        let parts = QueryParts::build(&["id"], &[("Id", Value::from(1_i64))]);
        assert_eq!(
            parts.update_statement("T").unwrap_err(),
            CoreError::NothingToUpdate {
                table: "T".to_string()
            }
        );
    }

    #[test]
    fn test_select_and_diagnostics() {
        let preds = [("Id", Value::from(1_i64)), ("Name", Value::from("O'Neil"))];
        let stmt = select_statement("Artists", &preds);
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"Artists\" WHERE \"Id\" = ?1 AND \"Name\" = ?2"
        );
        assert_eq!(render_predicates(&preds), "Id = 1 AND Name = \"O'Neil\"");
    }
}
