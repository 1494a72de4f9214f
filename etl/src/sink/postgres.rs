//! PostgreSQL sink.
//!
//! The connection is opened when a write starts and closed when it ends.
//! Drop, create and insert share one transaction, so a failed write rolls
//! back on drop.

use std::ops::Range;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{quote_ident, schema_of, validate_table_name, SqlType, TableSink};
use crate::config::DbConfig;
use crate::error::SinkResult;
use crate::models::{Dataset, Value};

/// PostgreSQL's per-statement bind parameter limit.
const MAX_BIND_PARAMS: usize = 65_535;

/// Writes datasets to PostgreSQL, replacing the target table.
pub struct PostgresSink {
    options: PgConnectOptions,
}

impl PostgresSink {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            options: config.connect_options(),
        }
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> SinkResult<u64> {
        validate_table_name(table)?;
        info!(table, "Connecting to PostgreSQL");

        let mut conn = PgConnection::connect_with(&self.options).await?;
        let written = write_table(&mut conn, table, dataset).await?;
        conn.close().await?;

        info!(rows = written, table, "Loaded rows");
        Ok(written)
    }
}

async fn write_table(conn: &mut PgConnection, table: &str, dataset: &Dataset) -> SinkResult<u64> {
    let schema = schema_of(dataset);
    let table_ident = quote_ident(table);
    let mut tx = conn.begin().await?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_ident))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&create_table_sql(&table_ident, &schema))
        .execute(&mut *tx)
        .await?;

    let rows = dataset.row_count();
    if !schema.is_empty() && rows > 0 {
        let insert_head = format!(
            "INSERT INTO {} ({}) ",
            table_ident,
            schema
                .iter()
                .map(|(name, _)| quote_ident(name))
                .collect::<Vec<_>>()
                .join(", ")
        );
        for range in insert_batches(rows, schema.len()) {
            let (start, end) = (range.start, range.end);
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(&insert_head);
            builder.push_values(range, |mut row, idx| {
                for (col, (_, ty)) in dataset.columns().iter().zip(&schema) {
                    bind_cell(&mut row, &col.values[idx], *ty);
                }
            });
            builder.build().execute(&mut *tx).await?;
            debug!(start, end, "Inserted batch");
        }
    }

    tx.commit().await?;
    Ok(rows as u64)
}

/// Row ranges for multi-row inserts, each binding at most
/// [`MAX_BIND_PARAMS`] parameters.
fn insert_batches(rows: usize, columns: usize) -> Vec<Range<usize>> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    let batch = (MAX_BIND_PARAMS / columns).max(1);
    (0..rows)
        .step_by(batch)
        .map(|start| start..(start + batch).min(rows))
        .collect()
}

fn create_table_sql(table_ident: &str, schema: &[(String, SqlType)]) -> String {
    let columns = schema
        .iter()
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", table_ident, columns)
}

fn bind_cell(
    row: &mut sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>,
    value: &Value,
    ty: SqlType,
) {
    match ty {
        SqlType::BigInt => row.push_bind(match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }),
        SqlType::Double => row.push_bind(value.as_f64()),
        SqlType::Text => row.push_bind(match value {
            Value::Missing => None,
            other => Some(other.to_string()),
        }),
    };
}
