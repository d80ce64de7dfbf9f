//! Schema assembly from raw introspection rows.
//!
//! [`SchemaBuilder`] is the database-independent half of introspection: it
//! receives foreign-key rows first and column rows second, exactly as the
//! metadata queries return them, and produces a [`Schema`].
//!
//! Foreign-key nullability is resolved incrementally while columns arrive.
//! The flag only ever flips from `false` to `true`, so column arrival order
//! does not matter.

use std::collections::BTreeMap;

use crate::model::{ColumnDefinition, ForeignKey, ForeignKeyPredicate, Schema, TableDefinition};
use crate::names::{contains_ignore_case, normalize_identifier};

/// Prefix of tables owned by the SQLite engine itself.
pub const DEFAULT_RESERVED_PREFIX: &str = "sqlite_";

/// One row of the column-metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub table: String,
    pub ordinal: i64,
    pub name: String,
    pub declared_type: String,
    /// Non-zero when the column must not be null.
    pub not_null: i64,
    /// Position within the primary key, `0` when not a key column.
    pub pk_ordinal: i64,
}

/// One row of the foreign-key metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub source_table: String,
    pub constraint_ordinal: i64,
    pub target_table: String,
    pub source_column: String,
    /// `None` when the constraint references the target's primary key implicitly.
    pub target_column: Option<String>,
}

/// Identity of a foreign key: normalized source table and constraint ordinal.
type ForeignKeyId = (String, i64);

/// Accumulates introspection rows into a [`Schema`].
///
/// # Examples
///
/// ```
/// use datatier_core::{ColumnRow, ForeignKeyRow, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::default();
/// builder.add_foreign_key_row(ForeignKeyRow {
///     source_table: "child".into(),
///     constraint_ordinal: 0,
///     target_table: "parent".into(),
///     source_column: "parentId".into(),
///     target_column: Some("id".into()),
/// });
/// builder.add_column_row(ColumnRow {
///     table: "child".into(),
///     ordinal: 0,
///     name: "parentId".into(),
///     declared_type: "INTEGER".into(),
///     not_null: 0,
///     pk_ordinal: 0,
/// });
///
/// let schema = builder.finish();
/// assert_eq!(schema.tables[0].name, "Child");
/// assert!(schema.foreign_keys[0].is_nullable);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    reserved_prefix: String,
    tables: Vec<TableDefinition>,
    foreign_keys: BTreeMap<ForeignKeyId, ForeignKey>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_PREFIX)
    }
}

impl SchemaBuilder {
    /// Creates a builder that skips tables whose name contains `reserved_prefix`.
    pub fn new(reserved_prefix: impl Into<String>) -> Self {
        Self {
            reserved_prefix: reserved_prefix.into(),
            tables: Vec::new(),
            foreign_keys: BTreeMap::new(),
        }
    }

    fn is_reserved(&self, normalized_table: &str) -> bool {
        !self.reserved_prefix.is_empty()
            && contains_ignore_case(normalized_table, &self.reserved_prefix)
    }

    /// Merges one foreign-key predicate row.
    ///
    /// Rows sharing `(source_table, constraint_ordinal)` are merged into a
    /// single [`ForeignKey`] whose predicate list grows by one per row.
    pub fn add_foreign_key_row(&mut self, row: ForeignKeyRow) {
        let source_table = normalize_identifier(&row.source_table);
        let target_table = normalize_identifier(&row.target_table);
        if self.is_reserved(&source_table) || self.is_reserved(&target_table) {
            return;
        }

        let key = (source_table.to_lowercase(), row.constraint_ordinal);
        let fk = self.foreign_keys.entry(key).or_insert_with(|| ForeignKey {
            source_table,
            ordinal: row.constraint_ordinal,
            target_table,
            predicates: Vec::new(),
            is_nullable: false,
        });

        fk.predicates.push(ForeignKeyPredicate {
            source_column: normalize_identifier(&row.source_column),
            target_column: row.target_column.as_deref().map(normalize_identifier),
        });
    }

    /// Appends one column, creating its table on first sight.
    ///
    /// Nullable columns mark every foreign key of the same table that uses
    /// the column as nullable.
    pub fn add_column_row(&mut self, row: ColumnRow) {
        let table_name = normalize_identifier(&row.table);
        if self.is_reserved(&table_name) {
            return;
        }

        let column = ColumnDefinition {
            name: normalize_identifier(&row.name),
            declared_type: row.declared_type,
            ordinal: row.ordinal,
            is_primary_key: row.pk_ordinal != 0,
            is_nullable: row.not_null == 0,
        };

        if column.is_nullable {
            for fk in self.foreign_keys.values_mut() {
                if fk.is_from(&table_name) && fk.uses_source_column(&column.name) {
                    fk.is_nullable = true;
                }
            }
        }

        match self.tables.iter_mut().find(|t| t.name == table_name) {
            Some(table) => table.columns.push(column),
            None => {
                let mut table = TableDefinition::new(table_name);
                table.columns.push(column);
                self.tables.push(table);
            }
        }
    }

    /// Resolves target tables and implicit target columns and returns the
    /// finished schema.
    ///
    /// SQLite matches table names case-insensitively, so a target table
    /// spelled differently in `REFERENCES` takes the spelling of the table
    /// definition. A predicate whose target column is unknown takes the
    /// target table's primary-key column at the same position. If the target
    /// table or that key column is unknown, the column name of the source
    /// side is used, as SQLite does for implicit references to a same-named
    /// column.
    pub fn finish(self) -> Schema {
        let tables = self.tables;
        let mut foreign_keys: Vec<ForeignKey> = self.foreign_keys.into_values().collect();

        for fk in &mut foreign_keys {
            let target = tables
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(&fk.target_table));
            if let Some(target) = target {
                fk.target_table.clone_from(&target.name);
            }
            let target_keys: Vec<String> = target
                .map(|t| t.key_fields().into_iter().map(str::to_string).collect())
                .unwrap_or_default();

            for (position, predicate) in fk.predicates.iter_mut().enumerate() {
                if predicate.target_column.is_none() {
                    let resolved = target_keys
                        .get(position)
                        .cloned()
                        .unwrap_or_else(|| predicate.source_column.clone());
                    predicate.target_column = Some(resolved);
                }
            }
        }

        Schema {
            tables,
            foreign_keys,
        }
    }
}
