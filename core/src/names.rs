//! Identifier normalization and quoting.

/// Upper-cases the first character of an identifier, leaving the rest as is.
///
/// Applied to every table and column name read from the schema source.
///
/// # Examples
///
/// ```
/// use datatier_core::normalize_identifier;
///
/// assert_eq!(normalize_identifier("albums"), "Albums");
/// assert_eq!(normalize_identifier("artistId"), "ArtistId");
/// assert_eq!(normalize_identifier(""), "");
/// ```
pub fn normalize_identifier(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Quotes an SQL identifier with double quotes, doubling embedded quotes.
///
/// # Examples
///
/// ```
/// use datatier_core::quote_identifier;
///
/// assert_eq!(quote_identifier("Name"), "\"Name\"");
/// assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Returns `true` if `name` contains `prefix`, ignoring ASCII case.
pub fn contains_ignore_case(name: &str, prefix: &str) -> bool {
    name.to_lowercase().contains(&prefix.to_lowercase())
}
