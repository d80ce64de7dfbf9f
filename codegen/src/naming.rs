//! Rust identifiers derived from schema names.
//!
//! Table names become `UpperCamelCase` type names and `snake_case` module
//! names; column names become `snake_case` field names. Keyword field names
//! are emitted as raw identifiers, except the four that cannot be raw
//! (`self`, `Self`, `crate`, `super`), which get a trailing underscore.
//! Module names double as file stems, so every keyword module name gets the
//! trailing underscore.

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span};

use crate::error::{CodegenError, Result};

const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "crate", "super"];

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

fn leading_digit_safe(name: String) -> String {
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{name}"),
        _ => name,
    }
}

/// Type name for a table, e.g. `Media_types` -> `MediaTypes`.
pub fn type_name(table: &str) -> String {
    leading_digit_safe(table.to_upper_camel_case())
}

/// Module and file stem for a table, e.g. `MediaTypes` -> `media_types`.
pub fn module_name(table: &str) -> String {
    let name = leading_digit_safe(table.to_snake_case());
    if KEYWORDS.contains(&name.as_str()) || NON_RAW_KEYWORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Field name for a column, e.g. `ArtistId` -> `artist_id`.
pub fn field_name(column: &str) -> String {
    leading_digit_safe(column.to_snake_case())
}

/// Builds an identifier from a derived name.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidIdentifier`] when `name` is empty or not an
/// identifier at all, e.g. a column named `"?"`.
pub fn ident(name: &str, source: &str) -> Result<Ident> {
    if name.is_empty() || name == "_" {
        return Err(CodegenError::InvalidIdentifier {
            name: source.to_string(),
            reason: "no identifier characters".to_string(),
        });
    }
    if NON_RAW_KEYWORDS.contains(&name) {
        return ident(&format!("{name}_"), source);
    }
    if KEYWORDS.contains(&name) {
        return Ok(Ident::new_raw(name, Span::call_site()));
    }
    syn::parse_str::<Ident>(name).map_err(|e| CodegenError::InvalidIdentifier {
        name: source.to_string(),
        reason: e.to_string(),
    })
}

/// Identifier of the struct generated for `table`.
pub fn type_ident(table: &str) -> Result<Ident> {
    ident(&type_name(table), table)
}

/// Identifier of the module generated for `table`.
pub fn module_ident(table: &str) -> Result<Ident> {
    ident(&module_name(table), table)
}

/// Identifier of the field generated for `column`.
pub fn field_ident(column: &str) -> Result<Ident> {
    ident(&field_name(column), column)
}
