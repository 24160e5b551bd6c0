/// Value Module
///
/// This module provides the tagged value type used for both positional
/// parameter binding and column extraction. A small closed set of variants
/// replaces per-type driver calls: every facade operation moves data in and
/// out of the database as a `Value`.
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Row, TypeInfo, ValueRef};
use uuid::Uuid;

/// Core value type for keyed database operations.
///
/// UUIDs are carried as their own variant but stored as hyphenated text,
/// which is the portable MySQL convention.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Blob(Vec<u8>),
    Uuid(Uuid),
}

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the contained text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained integer as an `i64`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained integer narrowed to `i32`, if it fits.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(n) => i32::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns the contained boolean.
    ///
    /// MySQL surfaces BOOLEAN columns as TINYINT(1), so integer 0/1 is
    /// accepted as well.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Returns the contained float.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Borrows the contained binary payload.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the contained UUID, parsing text values if necessary.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            Value::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Blob(b.to_vec())
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Binds a value as the next positional parameter of a driver query.
pub(crate) fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(n) => query.bind(*n),
        Value::Real(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Boolean(b) => query.bind(*b),
        Value::Blob(b) => query.bind(b.clone()),
        Value::Uuid(u) => query.bind(u.to_string()),
    }
}

/// Extracts one column of a MySQL row as a tagged value.
///
/// The column's declared type name drives the decode; columns the match
/// does not cover fall back to a best-effort chain of typed reads.
pub(crate) fn decode_column(row: &MySqlRow, idx: usize) -> Value {
    let value_ref = match row.try_get_raw(idx) {
        Ok(vr) => vr,
        Err(_) => return Value::Null,
    };
    if value_ref.is_null() {
        return Value::Null;
    }

    let type_info = value_ref.type_info().clone();
    let type_name = type_info.name();

    match type_name {
        "BOOLEAN" | "TINYINT(1)" => {
            if let Ok(v) = row.try_get::<bool, _>(idx) {
                return Value::Boolean(v);
            }
        }
        "TINYINT" => {
            if let Ok(v) = row.try_get::<i8, _>(idx) {
                return Value::Integer(v as i64);
            }
        }
        "SMALLINT" => {
            if let Ok(v) = row.try_get::<i16, _>(idx) {
                return Value::Integer(v as i64);
            }
        }
        "INT" | "MEDIUMINT" => {
            if let Ok(v) = row.try_get::<i32, _>(idx) {
                return Value::Integer(v as i64);
            }
        }
        "BIGINT" => {
            if let Ok(v) = row.try_get::<i64, _>(idx) {
                return Value::Integer(v);
            }
        }
        "FLOAT" => {
            if let Ok(v) = row.try_get::<f32, _>(idx) {
                return Value::Real(v as f64);
            }
        }
        "DOUBLE" => {
            if let Ok(v) = row.try_get::<f64, _>(idx) {
                return Value::Real(v);
            }
        }
        "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
            if let Ok(v) = row.try_get::<String, _>(idx) {
                return Value::Text(v);
            }
        }
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                return Value::Blob(v);
            }
        }
        _ => {}
    }

    row.try_get::<String, _>(idx)
        .map(Value::Text)
        .or_else(|_| row.try_get::<i64, _>(idx).map(Value::Integer))
        .or_else(|_| row.try_get::<f64, _>(idx).map(Value::Real))
        .or_else(|_| row.try_get::<bool, _>(idx).map(Value::Boolean))
        .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(Value::Blob))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(42i64), Value::Integer(42));
        assert_eq!(Value::from(1.5f64), Value::Real(1.5));
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from("alice"), Value::Text("alice".to_string()));
        assert_eq!(Value::from(vec![1u8, 2, 3]), Value::Blob(vec![1, 2, 3]));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Integer(7));
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::Text("x".to_string()).as_text(), Some("x"));
        assert_eq!(Value::Integer(9).as_long(), Some(9));
        assert_eq!(Value::Integer(9).as_int(), Some(9));
        assert_eq!(Value::Integer(i64::MAX).as_int(), None);
        assert_eq!(Value::Real(2.5).as_real(), Some(2.5));
        assert_eq!(Value::Blob(vec![0xff]).as_blob(), Some(&[0xff][..]));
        assert_eq!(Value::Null.as_text(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_boolean_coercion() {
        // TINYINT(1) columns decode as integers on some server versions
        assert_eq!(Value::Integer(0).as_boolean(), Some(false));
        assert_eq!(Value::Integer(1).as_boolean(), Some(true));
        assert_eq!(Value::Integer(2).as_boolean(), None);
        assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
    }

    #[test]
    fn test_uuid_roundtrip_through_text() {
        let id = Uuid::new_v4();
        let stored = Value::Text(id.to_string());
        assert_eq!(stored.as_uuid(), Some(id));
        assert_eq!(Value::Uuid(id).as_uuid(), Some(id));
        assert_eq!(Value::Text("not-a-uuid".to_string()).as_uuid(), None);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(3).to_string(), "3");
        assert_eq!(Value::Blob(vec![1, 2, 3, 4, 5]).to_string(), "<BLOB: 5 bytes>");
    }
}
