//! In-memory schema model.
//!
//! A [`Schema`] holds the tables, columns and foreign keys discovered by
//! introspection. Names are stored normalized (see
//! [`normalize_identifier`](crate::normalize_identifier)); lookups by name are
//! case-insensitive.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::type_map::{TypeMapping, map_type};

/// One database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Normalized column name.
    pub name: String,
    /// Raw declared type as reported by the schema source.
    pub declared_type: String,
    /// Declaration position within the table.
    pub ordinal: i64,
    pub is_primary_key: bool,
    pub is_nullable: bool,
}

impl ColumnDefinition {
    /// Maps this column's declared type through the type mapper.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedType`](crate::CoreError::UnsupportedType)
    /// if the declared type has no mapping.
    pub fn mapping(&self) -> Result<TypeMapping> {
        map_type(&self.declared_type, self.is_nullable)
    }
}

/// One database table with its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Normalized table name.
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Ordered names of the primary-key columns.
    pub fn key_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Finds a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// One `(source column, target column)` pair of a foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyPredicate {
    pub source_column: String,
    /// `None` until resolved when the constraint references the target's
    /// primary key implicitly.
    pub target_column: Option<String>,
}

/// One foreign-key constraint, identified by source table and ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub source_table: String,
    /// Constraint ordinal within the source table.
    pub ordinal: i64,
    pub target_table: String,
    pub predicates: Vec<ForeignKeyPredicate>,
    /// True iff at least one source column is nullable.
    pub is_nullable: bool,
}

impl ForeignKey {
    /// Returns `true` if this constraint is owned by `table`.
    pub fn is_from(&self, table: &str) -> bool {
        self.source_table.eq_ignore_ascii_case(table)
    }

    /// Returns `true` if this constraint references `table`.
    pub fn is_to(&self, table: &str) -> bool {
        self.target_table.eq_ignore_ascii_case(table)
    }

    /// Returns `true` if any predicate uses `column` on the source side.
    pub fn uses_source_column(&self, column: &str) -> bool {
        self.predicates
            .iter()
            .any(|p| p.source_column.eq_ignore_ascii_case(column))
    }

    /// Human-readable identity used in diagnostics, e.g. `Child#0 -> Parent`.
    pub fn describe(&self) -> String {
        format!(
            "{}#{} -> {}",
            self.source_table, self.ordinal, self.target_table
        )
    }
}

/// Introspected schema: tables in discovery order and foreign keys ordered by
/// `(source table, ordinal)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Schema {
    /// Finds a table by name, ignoring case.
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Foreign keys owned by `table` (parent relationships).
    pub fn parents_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys.iter().filter(move |fk| fk.is_from(table))
    }

    /// Foreign keys referencing `table` (child relationships).
    pub fn children_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys.iter().filter(move |fk| fk.is_to(table))
    }
}
