//! Table-name keyed lookup of generated entity types.
//!
//! Generated code registers each type once at startup (see the generated
//! `registry()` function). The registry then loads rows of any registered
//! table by name, returning type-erased [`Record`]s.

use std::collections::BTreeMap;
use std::fmt;

use datatier_core::Value;

use crate::access;
use crate::context::Context;
use crate::entity::Entity;
use crate::error::{Result, SqliteError};

/// Type-erased view of a materialized row.
pub trait Record: fmt::Debug {
    /// Table the row came from.
    fn table_name(&self) -> &'static str;
    /// Ordered `(column, value)` pairs of the row.
    fn column_values(&self) -> Vec<(&'static str, Value)>;
}

impl<T: Entity + fmt::Debug> Record for T {
    fn table_name(&self) -> &'static str {
        T::TABLE
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        self.values()
    }
}

type Loader = fn(&Context, &[(&str, Value)]) -> Result<Vec<Box<dyn Record>>>;

/// Registration of one entity type.
#[derive(Clone, Copy)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub key_fields: &'static [&'static str],
    loader: Loader,
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("table", &self.table)
            .field("key_fields", &self.key_fields)
            .finish_non_exhaustive()
    }
}

impl EntityDescriptor {
    /// Loads every row matching the predicates.
    pub fn load(&self, ctx: &Context, predicates: &[(&str, Value)]) -> Result<Vec<Box<dyn Record>>> {
        (self.loader)(ctx, predicates)
    }
}

fn load_records<T: Entity + fmt::Debug + 'static>(
    ctx: &Context,
    predicates: &[(&str, Value)],
) -> Result<Vec<Box<dyn Record>>> {
    let mut selection = access::collection::<T>(ctx, predicates)?;
    let mut records: Vec<Box<dyn Record>> = Vec::new();
    for item in selection.rows()? {
        records.push(Box::new(item?));
    }
    Ok(records)
}

/// Entity types keyed by case-insensitive table name.
///
/// # Examples
///
/// ```no_run
/// # use datatier_sqlite::{Context, Record, Registry};
/// # fn demo(registry: &Registry, ctx: &Context) -> datatier_sqlite::Result<()> {
/// for record in registry.load(ctx, "Albums", &[])? {
///     println!("{:?}", record.column_values());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: BTreeMap<String, EntityDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its table name. A later registration for the same
    /// table replaces the earlier one.
    pub fn register<T: Entity + fmt::Debug + 'static>(mut self) -> Self {
        self.entries.insert(
            T::TABLE.to_lowercase(),
            EntityDescriptor {
                table: T::TABLE,
                key_fields: T::KEY_FIELDS,
                loader: load_records::<T>,
            },
        );
        self
    }

    /// Looks up a registration by table name, ignoring case.
    pub fn get(&self, table: &str) -> Option<&EntityDescriptor> {
        self.entries.get(&table.to_lowercase())
    }

    /// Registered table names, sorted case-insensitively.
    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.values().map(|d| d.table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads the rows of a registered table.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::UnknownTable`] for an unregistered table.
    pub fn load(
        &self,
        ctx: &Context,
        table: &str,
        predicates: &[(&str, Value)],
    ) -> Result<Vec<Box<dyn Record>>> {
        self.get(table)
            .ok_or_else(|| SqliteError::UnknownTable(table.to_string()))?
            .load(ctx, predicates)
    }
}
