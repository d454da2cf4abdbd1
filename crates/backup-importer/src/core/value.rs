//! Column values and records moved between the backup and active databases.
//!
//! Rows travel one at a time through the import pipeline, so values are
//! owned rather than borrowed from driver buffers.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single column value, independent of the source database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 16-bit signed integer (smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// 32-bit floating point (real/float4).
    F32(f32),

    /// 64-bit floating point (double precision/float8).
    F64(f64),

    /// Text/string data.
    Text(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// UUID/GUID value.
    Uuid(Uuid),

    /// Decimal value with arbitrary precision.
    Decimal(Decimal),

    /// Date without time component.
    Date(NaiveDate),

    /// Time without date component.
    Time(NaiveTime),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),

    /// Timestamp with timezone offset.
    DateTimeOffset(DateTime<FixedOffset>),
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// From implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
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

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTimeOffset(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// One row fetched from the backup database, as named column values.
///
/// Column order is preserved from the fetch (or from the projection that
/// produced it).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a column value.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    /// Look up a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Column names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Keep only the named columns, in the order given. Unknown names are
    /// skipped.
    #[must_use]
    pub fn project(&self, columns: &[String]) -> Record {
        let mut out = Record::new();
        for name in columns {
            if let Some(value) = self.get(name) {
                out.push(name.clone(), value.clone());
            }
        }
        out
    }

    /// Drop the named columns, keeping everything else in order.
    #[must_use]
    pub fn without_columns(self, drop: &[String]) -> Record {
        let mut out = Record::new();
        for (column, value) in self.columns.into_iter().zip(self.values) {
            if !drop.contains(&column) {
                out.push(column, value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::I32(42).is_null());
    }

    #[test]
    fn test_from_implementations() {
        let v: Value = 42i32.into();
        assert_eq!(v, Value::I32(42));

        let v: Value = "hello".into();
        assert_eq!(v, Value::Text("hello".to_string()));

        let v: Value = Option::<i64>::None.into();
        assert_eq!(v, Value::Null);

        let v: Value = Some(7i64).into();
        assert_eq!(v, Value::I64(7));
    }

    #[test]
    fn test_record_get_and_order() {
        let record = Record::new().with("id", 1i64).with("name", "Ada");

        assert_eq!(record.len(), 2);
        assert_eq!(record.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(record.get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_record_project() {
        let record = Record::new()
            .with("id", 1i64)
            .with("name", "Ada")
            .with("email", "ada@example.com");

        let projected = record.project(&["email".to_string(), "name".to_string()]);
        assert_eq!(
            projected.columns(),
            &["email".to_string(), "name".to_string()]
        );
        assert_eq!(projected.get("id"), None);
    }

    #[test]
    fn test_record_project_skips_unknown_columns() {
        let record = Record::new().with("id", 1i64);
        let projected = record.project(&["id".to_string(), "nope".to_string()]);
        assert_eq!(projected.len(), 1);
    }

    #[test]
    fn test_record_without_columns() {
        let record = Record::new().with("id", 1i64).with("name", "Ada");
        let filtered = record.without_columns(&["id".to_string()]);

        assert_eq!(filtered.columns(), &["name".to_string()]);
        assert_eq!(filtered.get("id"), None);
    }
}
