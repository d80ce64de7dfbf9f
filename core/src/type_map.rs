//! Declared SQL type to host type mapping.
//!
//! The mapping is a small, closed rule table. A declared type is matched
//! case-insensitively against the rules in order; the first match wins and
//! anything unmatched is an [`UnsupportedType`](CoreError::UnsupportedType)
//! error. Supporting another declared type means adding a row to [`RULES`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Host type class a column maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    /// 64-bit signed integer (`i64`).
    Int64,
    /// Double-precision float (`f64`).
    Double,
    /// Owned text (`String`).
    Text,
    /// Date and time without zone (`chrono::NaiveDateTime`).
    DateTime,
}

impl HostType {
    /// Whether values of this type are `Copy` in Rust.
    pub fn is_copy(self) -> bool {
        !matches!(self, HostType::Text)
    }
}

/// Which typed read is used to pull the column out of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReaderKind {
    Int64,
    Double,
    String,
    DateTime,
}

/// Initializer used when a field is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationDefault {
    /// No explicit initializer; the type's own default applies.
    Bare,
    /// Initialized to the empty string.
    EmptyText,
}

/// Result of mapping one declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeMapping {
    pub host_type: HostType,
    /// Whether the field is wrapped in `Option`.
    pub nullable: bool,
    pub reader: ReaderKind,
    pub default: DeclarationDefault,
}

/// How a rule compares against the upper-cased declared type.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    Exact(&'static str),
    Contains(&'static str),
}

impl Pattern {
    fn matches(self, declared_upper: &str) -> bool {
        match self {
            Pattern::Exact(s) => declared_upper == s,
            Pattern::Contains(s) => declared_upper.contains(s),
        }
    }
}

/// Ordered mapping rules: pattern, host type, reader.
const RULES: &[(Pattern, HostType, ReaderKind)] = &[
    (Pattern::Exact("INTEGER"), HostType::Int64, ReaderKind::Int64),
    (Pattern::Exact("DATETIME"), HostType::DateTime, ReaderKind::DateTime),
    (Pattern::Contains("NVARCHAR"), HostType::Text, ReaderKind::String),
    (Pattern::Contains("TEXT"), HostType::Text, ReaderKind::String),
    (Pattern::Contains("NUMERIC"), HostType::Double, ReaderKind::Double),
];

/// Maps a declared column type and nullability to its host representation.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedType`] when no rule matches.
///
/// # Examples
///
/// ```
/// use datatier_core::{map_type, DeclarationDefault, HostType, ReaderKind};
///
/// let m = map_type("text", false).unwrap();
/// assert_eq!(m.host_type, HostType::Text);
/// assert_eq!(m.reader, ReaderKind::String);
/// assert_eq!(m.default, DeclarationDefault::EmptyText);
///
/// assert!(map_type("BLOB", false).is_err());
/// ```
pub fn map_type(declared_type: &str, nullable: bool) -> Result<TypeMapping> {
    let upper = declared_type.trim().to_uppercase();
    let (_, host_type, reader) = RULES
        .iter()
        .find(|(pattern, _, _)| pattern.matches(&upper))
        .ok_or_else(|| CoreError::UnsupportedType {
            declared_type: declared_type.to_string(),
        })?;

    let default = if *host_type == HostType::Text && !nullable {
        DeclarationDefault::EmptyText
    } else {
        DeclarationDefault::Bare
    };

    Ok(TypeMapping {
        host_type: *host_type,
        nullable,
        reader: *reader,
        default,
    })
}
