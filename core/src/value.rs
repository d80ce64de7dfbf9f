//! Column values passed between generated types and the runtime.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fixed text format for date-time values, `yyyy-MM-dd HH:mm:ss`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single column value.
///
/// [`Display`](fmt::Display) renders the diagnostic SQL literal form: text in
/// double quotes, date-times in [`DATETIME_FORMAT`], null as `NULL`, numbers
/// in their natural form. Statements never embed this form; values are bound
/// as parameters.
///
/// # Examples
///
/// ```
/// use datatier_core::Value;
///
/// assert_eq!(Value::from(1_i64).to_string(), "1");
/// assert_eq!(Value::from("Ann").to_string(), "\"Ann\"");
/// assert_eq!(Value::from(None::<String>).to_string(), "NULL");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "\"{v}\""),
            Value::DateTime(v) => write!(f, "{}", v.format(DATETIME_FORMAT)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_datetime_uses_fixed_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(Value::from(dt).to_string(), "2024-03-09 07:05:00");
    }

    #[test]
    fn test_null_is_not_text() {
        let v = Value::from(None::<i64>);
        assert!(v.is_null());
        assert_eq!(v.to_string(), "NULL");
        assert_ne!(v.to_string(), "null");
    }

    #[test]
    fn test_real_renders_naturally() {
        assert_eq!(Value::from(0.99).to_string(), "0.99");
        assert_eq!(Value::from(Some(-3_i64)).to_string(), "-3");
    }
}
