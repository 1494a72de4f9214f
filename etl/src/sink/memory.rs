//! In-process table store with the same full-replace semantics as the
//! database sink.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{schema_of, validate_table_name, SqlType, TableSink};
use crate::error::SinkResult;
use crate::models::{Dataset, Value};

/// A table held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub schema: Vec<(String, SqlType)>,
    pub rows: Vec<Vec<Value>>,
}

impl StoredTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Cells of `column`, in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.iter().position(|(name, _)| name == column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// Keeps tables in a map keyed by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: HashMap<String, StoredTable>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&StoredTable> {
        self.tables.get(name)
    }

    /// Number of completed `replace_table` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> SinkResult<u64> {
        validate_table_name(table)?;

        let rows: Vec<Vec<Value>> = (0..dataset.row_count())
            .map(|r| dataset.columns().iter().map(|c| c.values[r].clone()).collect())
            .collect();
        let written = rows.len() as u64;

        self.tables.insert(
            table.to_string(),
            StoredTable {
                schema: schema_of(dataset),
                rows,
            },
        );
        self.writes += 1;
        Ok(written)
    }
}
