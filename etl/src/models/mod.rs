//! In-memory tabular model shared by every pipeline stage.
//!
//! - [`Value`] - A single cell (integer, float, text, or missing)
//! - [`Column`] - A named sequence of cells
//! - [`Dataset`] - Ordered, equal-length columns with unique names
//!
//! Stages never mutate a dataset they were handed; they build a new one.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::fmt;

use crate::error::DatasetError;

// =============================================================================
// Cell Value
// =============================================================================

/// A single cell.
///
/// `Missing` is the explicit absent marker and is distinct from `Int(0)`
/// or `Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Key used when grouping rows by this cell. `None` for missing cells.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

// =============================================================================
// Column
// =============================================================================

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// An ordered collection of equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, checking that lengths agree and names are unique.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        let expected = columns.first().map(Column::len).unwrap_or(0);

        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != expected {
                return Err(DatasetError::LengthMismatch {
                    column: col.name.clone(),
                    expected,
                    found: col.len(),
                });
            }
        }

        Ok(Self { columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell at `(row, column)`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Set a column, replacing an existing one of the same name in place
    /// or appending it at the end.
    ///
    /// Callers derive `values` from columns of this dataset, so the row
    /// count already matches.
    pub(crate) fn with_column(mut self, name: &str, values: Vec<Value>) -> Self {
        debug_assert!(
            self.columns.is_empty() || values.len() == self.row_count(),
            "derived column '{}' has the wrong length",
            name
        );
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        self
    }

    /// Drop a column if present.
    pub(crate) fn without_column(mut self, name: &str) -> Self {
        self.columns.retain(|c| c.name != name);
        self
    }

    /// Replace every column name with `names`, in order.
    ///
    /// Callers guarantee `names` has one unique entry per column.
    pub(crate) fn with_column_names(mut self, names: Vec<String>) -> Self {
        debug_assert_eq!(names.len(), self.columns.len());
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.name = name;
        }
        self
    }

    /// Rows as JSON objects keyed by column name, in column order.
    pub fn to_records(&self) -> Vec<JsonValue> {
        (0..self.row_count()).map(|row| self.record(row)).collect()
    }

    /// The first `n` rows as JSON objects.
    pub fn head(&self, n: usize) -> Vec<JsonValue> {
        (0..self.row_count().min(n)).map(|row| self.record(row)).collect()
    }

    fn record(&self, row: usize) -> JsonValue {
        let mut obj = Map::new();
        for col in &self.columns {
            let cell = serde_json::to_value(&col.values[row]).unwrap_or(JsonValue::Null);
            obj.insert(col.name.clone(), cell);
        }
        JsonValue::Object(obj)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("age", vec![Value::Int(30), Value::Missing]),
            Column::new("category", vec![Value::text("Clothing"), Value::text("")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let err = Dataset::from_columns(vec![
            Column::new("a", vec![Value::Int(1), Value::Int(2)]),
            Column::new("b", vec![Value::Int(1)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::LengthMismatch {
                column: "b".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_from_columns_rejects_duplicates() {
        let err = Dataset::from_columns(vec![
            Column::new("a", vec![]),
            Column::new("a", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_missing_is_distinct_from_empty() {
        let ds = sample();
        assert!(ds.get(1, "age").unwrap().is_missing());
        assert!(!ds.get(1, "category").unwrap().is_missing());
        assert_eq!(ds.get(1, "category").unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let ds = sample().with_column("age", vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(ds.column_names(), vec!["age", "category"]);
        assert_eq!(ds.get(1, "age"), Some(&Value::Int(2)));

        let ds = ds.with_column("extra", vec![Value::Missing, Value::Missing]);
        assert_eq!(ds.column_names(), vec!["age", "category", "extra"]);
    }

    #[test]
    fn test_records_serialize_missing_as_null() {
        let records = sample().to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["age"], 30);
        assert!(records[1]["age"].is_null());
        assert_eq!(records[0]["category"], "Clothing");
    }

    #[test]
    fn test_head_limits_rows() {
        assert_eq!(sample().head(1).len(), 1);
        assert_eq!(sample().head(10).len(), 2);
    }

    #[test]
    fn test_display_keeps_float_type() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(3.55).to_string(), "3.55");
        assert_eq!(Value::Int(3).to_string(), "3");
        assert_eq!(Value::Missing.to_string(), "");
    }
}
