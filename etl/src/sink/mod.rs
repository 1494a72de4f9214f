//! Destination stores with full-replace semantics.
//!
//! - [`postgres::PostgresSink`] - PostgreSQL via sqlx
//! - [`memory::MemorySink`] - In-process tables, used by tests and dry runs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SinkError, SinkResult};
use crate::models::{Column, Dataset, Value};

pub use memory::MemorySink;
pub use postgres::PostgresSink;

/// Default destination table.
pub const DEFAULT_TABLE: &str = "customer";

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name pattern"));

/// A store that can replace a whole table with a dataset.
#[async_trait]
pub trait TableSink {
    /// Drop any existing `table`, recreate it from `dataset`'s schema and
    /// insert every row. Returns the number of rows written.
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> SinkResult<u64>;
}

/// Column storage type inferred from cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Double,
    Text,
}

impl SqlType {
    /// `BIGINT` if every present cell is an integer, `DOUBLE PRECISION` if
    /// every present cell is numeric, `TEXT` otherwise (including
    /// all-missing columns).
    pub fn infer(column: &Column) -> Self {
        let mut present = column.values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return SqlType::Text;
        }

        let mut ty = SqlType::BigInt;
        for value in present {
            match value {
                Value::Int(_) => {}
                Value::Float(_) => ty = SqlType::Double,
                _ => return SqlType::Text,
            }
        }
        ty
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
        }
    }
}

/// Reject anything that is not a plain SQL identifier.
pub fn validate_table_name(table: &str) -> SinkResult<()> {
    if TABLE_NAME.is_match(table) {
        Ok(())
    } else {
        Err(SinkError::InvalidTableName(table.to_string()))
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Inferred `(name, type)` for every column of `dataset`.
pub fn schema_of(dataset: &Dataset) -> Vec<(String, SqlType)> {
    dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), SqlType::infer(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_inference() {
        let ints = Column::new("a", vec![Value::Int(1), Value::Missing]);
        let mixed = Column::new("b", vec![Value::Int(1), Value::Float(2.5)]);
        let text = Column::new("c", vec![Value::Int(1), Value::text("x")]);
        let empty = Column::new("d", vec![Value::Missing]);

        assert_eq!(SqlType::infer(&ints), SqlType::BigInt);
        assert_eq!(SqlType::infer(&mixed), SqlType::Double);
        assert_eq!(SqlType::infer(&text), SqlType::Text);
        assert_eq!(SqlType::infer(&empty), SqlType::Text);
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("customer").is_ok());
        assert!(validate_table_name("_stage_2").is_ok());
        assert!(validate_table_name("2fast").is_err());
        assert!(validate_table_name("customer; DROP TABLE x").is_err());
        assert!(validate_table_name("").is_err());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("age"), "\"age\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
