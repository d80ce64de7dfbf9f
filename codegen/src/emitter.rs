//! Rust source emission for introspected tables.
//!
//! Each table becomes one [`GeneratedUnit`]: a struct with one field per
//! column, relationship accessors derived from the foreign keys, mutation
//! wrappers, and an `Entity` implementation that the runtime drives. All
//! paths into the runtime crate are fully qualified, so table names such as
//! `Context` or `Value` never shadow runtime items.
//!
//! Units are emitted in memory; nothing is written here.

use std::collections::{HashMap, HashSet};

use datatier_core::{
    ColumnDefinition, DeclarationDefault, ForeignKey, HostType, ReaderKind, Schema,
    TableDefinition, TypeMapping,
};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;
use tracing::{debug, info, warn};

use crate::error::{CodegenError, Result};
use crate::format::{GENERATED_MARKER, render_source};
use crate::naming;

/// File name of the module index unit.
pub const MODULE_INDEX_FILE: &str = "mod.rs";

/// Settings that shape emitted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Path of the runtime crate as seen from the generated code.
    pub runtime_crate: String,
    /// Whether to run `rustfmt` over the emitted source.
    pub format: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "datatier_sqlite".to_string(),
            format: true,
        }
    }
}

/// Emitted source for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub table: String,
    pub type_name: String,
    pub module: String,
    pub file_name: String,
    pub source: String,
}

/// Emitted `mod.rs` declaring every generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIndex {
    pub file_name: String,
    pub source: String,
}

struct Field<'a> {
    column: &'a ColumnDefinition,
    ident: Ident,
    mapping: TypeMapping,
}

enum Direction {
    Parent,
    Child,
}

struct Accessor<'a> {
    fk: &'a ForeignKey,
    direction: Direction,
    /// Table on the other end of the constraint.
    other: &'a str,
    /// `(column of the other table, field of this table)` per predicate.
    pairs: Vec<(String, usize)>,
    name: String,
}

/// Emits every table of `schema`, in schema order.
///
/// All units are produced before the caller writes anything, so one
/// unsupported column type fails the whole run without partial output.
///
/// # Errors
///
/// Returns [`CodegenError::UnsupportedColumnType`] for an unmapped declared
/// type and [`CodegenError::InvalidIdentifier`] when two tables would produce
/// the same type or module name, or a name has no Rust spelling.
pub fn emit_all(schema: &Schema, options: &EmitOptions) -> Result<Vec<GeneratedUnit>> {
    check_unique_names(schema)?;
    let units = schema
        .tables
        .iter()
        .map(|table| emit_unit(schema, table, options))
        .collect::<Result<Vec<_>>>()?;
    info!(units = units.len(), "emitted data-access units");
    Ok(units)
}

fn check_unique_names(schema: &Schema) -> Result<()> {
    let mut types: HashMap<String, &str> = HashMap::new();
    let mut modules: HashMap<String, &str> = HashMap::new();
    for table in &schema.tables {
        for (seen, name, kind) in [
            (&mut types, naming::type_name(&table.name), "type"),
            (&mut modules, naming::module_name(&table.name), "module"),
        ] {
            if let Some(first) = seen.insert(name.clone(), &table.name) {
                return Err(CodegenError::InvalidIdentifier {
                    name: table.name.clone(),
                    reason: format!("{kind} name `{name}` is already used by table '{first}'"),
                });
            }
        }
    }
    Ok(())
}

/// Emits the unit for one table of `schema`.
///
/// # Errors
///
/// Returns [`CodegenError::UnsupportedColumnType`] if a column's declared
/// type has no mapping, [`CodegenError::InvalidIdentifier`] if a name cannot
/// be spelled in Rust, and [`CodegenError::InvalidSource`] if the emitted
/// tokens do not parse.
pub fn emit_unit(schema: &Schema, table: &TableDefinition, options: &EmitOptions) -> Result<GeneratedUnit> {
    let runtime = runtime_path(options)?;
    let fields = fields(table)?;
    let accessors = plan_accessors(schema, table, &fields);

    let ty = naming::type_ident(&table.name)?;
    let table_lit = table.name.as_str();
    let keys = table.key_fields();

    let field_idents: Vec<&Ident> = fields.iter().map(|f| &f.ident).collect();
    let field_docs = fields.iter().map(|f| field_doc(f.column));
    let field_types = fields.iter().map(|f| field_type(&f.mapping, &runtime));
    let defaults = fields.iter().map(|f| match f.mapping.default {
        DeclarationDefault::EmptyText => quote!(::std::string::String::new()),
        DeclarationDefault::Bare => quote!(::std::default::Default::default()),
    });
    let reader_types = fields.iter().map(|f| reader_type(&f.mapping, &runtime));
    let indexes = (0..fields.len()).map(Literal::usize_unsuffixed);
    let columns = fields.iter().map(|f| f.column.name.as_str());
    let values = fields.iter().map(|f| value_expr(f, &runtime));

    let accessor_fns = accessors
        .iter()
        .map(|a| accessor_tokens(a, &fields, &runtime))
        .collect::<Result<Vec<_>>>()?;

    let struct_doc = format!(" Row of table `{}`.", table.name);
    let tokens = quote! {
        #[doc = #struct_doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ty {
            #(
                #[doc = #field_docs]
                pub #field_idents: #field_types,
            )*
        }

        impl ::std::default::Default for #ty {
            fn default() -> Self {
                Self {
                    #( #field_idents: #defaults, )*
                }
            }
        }

        impl #ty {
            #(#accessor_fns)*

            #[doc = " Inserts this row, or updates its non-key columns when the key already exists."]
            pub fn add_update(&self, ctx: &#runtime::Context) -> #runtime::Result<()> {
                #runtime::upsert::<Self>(ctx, &<Self as #runtime::Entity>::values(self))
            }

            #[doc = " Inserts this row."]
            pub fn insert(&self, ctx: &#runtime::Context) -> #runtime::Result<()> {
                #runtime::insert::<Self>(ctx, &<Self as #runtime::Entity>::values(self))
            }

            #[doc = " Updates the non-key columns of the row with this key."]
            pub fn update(&self, ctx: &#runtime::Context) -> #runtime::Result<()> {
                #runtime::update::<Self>(ctx, &<Self as #runtime::Entity>::values(self))
            }

            #[doc = " Deletes the row with this key."]
            pub fn delete(&self, ctx: &#runtime::Context) -> #runtime::Result<()> {
                #runtime::delete::<Self>(ctx, &<Self as #runtime::Entity>::values(self))
            }
        }

        impl #runtime::Entity for #ty {
            const TABLE: &'static str = #table_lit;
            const KEY_FIELDS: &'static [&'static str] = &[#(#keys),*];

            fn from_row(row: &#runtime::Row<'_>) -> #runtime::rusqlite::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #( #field_idents: row.get::<_, #reader_types>(#indexes)?, )*
                })
            }

            fn values(&self) -> ::std::vec::Vec<(&'static str, #runtime::Value)> {
                ::std::vec![ #( (#columns, #values) ),* ]
            }
        }
    };

    let module = naming::module_name(&table.name);
    let file_name = format!("{module}.rs");
    let header = format!(
        "{GENERATED_MARKER} from table \"{}\". Do not edit by hand.",
        table.name
    );
    let source = render_source(tokens, &file_name, &header, options.format)?;
    debug!(table = %table.name, file = %file_name, accessors = accessors.len(), "emitted unit");

    Ok(GeneratedUnit {
        table: table.name.clone(),
        type_name: ty.to_string(),
        module,
        file_name,
        source,
    })
}

/// Emits `mod.rs` for a set of units: one `pub mod` and one re-export per
/// unit, plus a `registry()` registering every generated type.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidIdentifier`] if the runtime crate path is
/// invalid and [`CodegenError::InvalidSource`] if the tokens do not parse.
pub fn emit_module_index(units: &[GeneratedUnit], options: &EmitOptions) -> Result<ModuleIndex> {
    let runtime = runtime_path(options)?;
    let modules = units
        .iter()
        .map(|u| naming::ident(&u.module, &u.table))
        .collect::<Result<Vec<_>>>()?;
    let types = units
        .iter()
        .map(|u| naming::type_ident(&u.table))
        .collect::<Result<Vec<_>>>()?;

    let tokens = quote! {
        #( pub mod #modules; )*

        #( pub use #modules::#types; )*

        #[doc = " Registry of every generated type, keyed by table name."]
        pub fn registry() -> #runtime::Registry {
            #runtime::Registry::new()
                #( .register::<#types>() )*
        }
    };

    let header = format!("{GENERATED_MARKER}. Do not edit by hand.");
    let source = render_source(tokens, MODULE_INDEX_FILE, &header, options.format)?;
    Ok(ModuleIndex {
        file_name: MODULE_INDEX_FILE.to_string(),
        source,
    })
}

fn runtime_path(options: &EmitOptions) -> Result<syn::Path> {
    syn::parse_str::<syn::Path>(&options.runtime_crate).map_err(|e| CodegenError::InvalidIdentifier {
        name: options.runtime_crate.clone(),
        reason: format!("not a crate path: {e}"),
    })
}

fn fields(table: &TableDefinition) -> Result<Vec<Field<'_>>> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut fields = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let mapping = column
            .mapping()
            .map_err(|_| CodegenError::UnsupportedColumnType {
                table: table.name.clone(),
                column: column.name.clone(),
                declared_type: column.declared_type.clone(),
            })?;
        let ident = naming::field_ident(&column.name)?;
        if let Some(first) = seen.insert(ident.to_string(), &column.name) {
            return Err(CodegenError::InvalidIdentifier {
                name: format!("{}.{}", table.name, column.name),
                reason: format!("field name `{ident}` is already used by column '{first}'"),
            });
        }
        fields.push(Field {
            column,
            ident,
            mapping,
        });
    }
    Ok(fields)
}

fn field_position(fields: &[Field<'_>], column: &str) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.column.name.eq_ignore_ascii_case(column))
}

/// Collects parent and child accessors in foreign-key order and assigns
/// collision-free names.
fn plan_accessors<'a>(
    schema: &'a Schema,
    table: &TableDefinition,
    fields: &[Field<'_>],
) -> Vec<Accessor<'a>> {
    let mut accessors = Vec::new();
    for fk in &schema.foreign_keys {
        if fk.is_from(&table.name) {
            accessors.extend(plan_one(schema, fk, Direction::Parent, fields));
        }
        if fk.is_to(&table.name) {
            accessors.extend(plan_one(schema, fk, Direction::Child, fields));
        }
    }
    assign_names(&mut accessors);
    accessors
}

fn plan_one<'a>(
    schema: &'a Schema,
    fk: &'a ForeignKey,
    direction: Direction,
    fields: &[Field<'_>],
) -> Option<Accessor<'a>> {
    let referenced = match direction {
        Direction::Parent => &fk.target_table,
        Direction::Child => &fk.source_table,
    };
    let Some(other) = schema.table(referenced).map(|t| t.name.as_str()) else {
        warn!(
            constraint = %fk.describe(),
            table = %referenced,
            "skipping foreign key to a table that is not generated"
        );
        return None;
    };

    let mut pairs = Vec::with_capacity(fk.predicates.len());
    for predicate in &fk.predicates {
        let target = predicate
            .target_column
            .clone()
            .unwrap_or_else(|| predicate.source_column.clone());
        let (other_column, own_column) = match direction {
            Direction::Parent => (target, predicate.source_column.clone()),
            Direction::Child => (predicate.source_column.clone(), target),
        };
        let Some(position) = field_position(fields, &own_column) else {
            warn!(
                constraint = %fk.describe(),
                column = %own_column,
                "skipping foreign key on an unknown column"
            );
            return None;
        };
        pairs.push((other_column, position));
    }

    Some(Accessor {
        fk,
        direction,
        other,
        pairs,
        name: format!("fk_{}", naming::module_name(other)),
    })
}

/// Accessors sharing a name get a `_by_<source columns>` suffix. A child
/// accessor that still clashes with a parent accessor of the same constraint,
/// as in a self reference, becomes `fk_<table>_children_by_<source columns>`.
/// Names that clash after that get a numeric suffix in emission order.
fn assign_names(accessors: &mut [Accessor<'_>]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for accessor in accessors.iter() {
        *counts.entry(accessor.name.clone()).or_default() += 1;
    }
    for accessor in accessors.iter_mut() {
        if counts[&accessor.name] > 1 {
            accessor.name = format!("{}_by_{}", accessor.name, source_columns(accessor.fk));
        }
    }

    let mut seen = HashSet::new();
    for accessor in accessors.iter_mut() {
        if seen.insert(accessor.name.clone()) {
            continue;
        }
        if matches!(accessor.direction, Direction::Child) {
            let children = format!(
                "fk_{}_children_by_{}",
                naming::module_name(accessor.other),
                source_columns(accessor.fk)
            );
            if seen.insert(children.clone()) {
                accessor.name = children;
                continue;
            }
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{n}", accessor.name);
            if seen.insert(candidate.clone()) {
                accessor.name = candidate;
                break;
            }
            n += 1;
        }
    }
}

fn source_columns(fk: &ForeignKey) -> String {
    fk.predicates
        .iter()
        .map(|p| naming::field_name(&p.source_column))
        .collect::<Vec<_>>()
        .join("_")
}

fn accessor_tokens(accessor: &Accessor<'_>, fields: &[Field<'_>], runtime: &syn::Path) -> Result<TokenStream> {
    let name = naming::ident(&accessor.name, &accessor.fk.describe())?;
    let module = naming::module_ident(accessor.other)?;
    let other_ty = naming::type_ident(accessor.other)?;
    let target = quote!(super::#module::#other_ty);

    let columns = accessor.pairs.iter().map(|(column, _)| column.as_str());
    let values = accessor
        .pairs
        .iter()
        .map(|(_, position)| value_expr(&fields[*position], runtime));
    let predicates = quote!(&[ #( (#columns, #values) ),* ]);

    let own_columns: Vec<&str> = accessor
        .pairs
        .iter()
        .map(|(_, position)| fields[*position].column.name.as_str())
        .collect();
    let own_columns = own_columns.join(", ");

    let tokens = match accessor.direction {
        Direction::Parent if accessor.fk.is_nullable => {
            let doc = format!(" Row of `{}` referenced by `{own_columns}`, if any.", accessor.other);
            quote! {
                #[doc = #doc]
                pub fn #name(&self, ctx: &#runtime::Context) -> #runtime::Result<::std::option::Option<#target>> {
                    <#target as #runtime::Entity>::scalar(ctx, #predicates)
                }
            }
        }
        Direction::Parent => {
            let doc = format!(" Row of `{}` referenced by `{own_columns}`.", accessor.other);
            quote! {
                #[doc = #doc]
                pub fn #name(&self, ctx: &#runtime::Context) -> #runtime::Result<#target> {
                    <#target as #runtime::Entity>::scalar_strict(ctx, #predicates)
                }
            }
        }
        Direction::Child => {
            let doc = format!(
                " Rows of `{}` whose foreign key references `{own_columns}` of this row.",
                accessor.other
            );
            quote! {
                #[doc = #doc]
                pub fn #name<'c>(&self, ctx: &'c #runtime::Context) -> #runtime::Result<#runtime::Selection<'c, #target>> {
                    <#target as #runtime::Entity>::collection(ctx, #predicates)
                }
            }
        }
    };
    Ok(tokens)
}

fn field_doc(column: &ColumnDefinition) -> String {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    format!(
        " Nullable: {}. Primary key: {}. Declared type: {}.",
        yes_no(column.is_nullable),
        yes_no(column.is_primary_key),
        column.declared_type
    )
}

fn optional(inner: TokenStream, nullable: bool) -> TokenStream {
    if nullable {
        quote!(::std::option::Option<#inner>)
    } else {
        inner
    }
}

fn field_type(mapping: &TypeMapping, runtime: &syn::Path) -> TokenStream {
    let inner = match mapping.host_type {
        HostType::Int64 => quote!(i64),
        HostType::Double => quote!(f64),
        HostType::Text => quote!(::std::string::String),
        HostType::DateTime => quote!(#runtime::chrono::NaiveDateTime),
    };
    optional(inner, mapping.nullable)
}

fn reader_type(mapping: &TypeMapping, runtime: &syn::Path) -> TokenStream {
    let inner = match mapping.reader {
        ReaderKind::Int64 => quote!(i64),
        ReaderKind::Double => quote!(f64),
        ReaderKind::String => quote!(::std::string::String),
        ReaderKind::DateTime => quote!(#runtime::chrono::NaiveDateTime),
    };
    optional(inner, mapping.nullable)
}

fn value_expr(field: &Field<'_>, runtime: &syn::Path) -> TokenStream {
    let ident = &field.ident;
    if field.mapping.host_type.is_copy() {
        quote!(#runtime::Value::from(self.#ident))
    } else {
        quote!(#runtime::Value::from(self.#ident.clone()))
    }
}
