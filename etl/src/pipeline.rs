//! High-level pipeline API: read, transform, load.
//!
//! ```text
//! Read → Normalize → Impute → Derive Features → Prune → Write → Done
//! ```
//!
//! Any stage failure halts the run. There is no resume.
//!
//! # Example
//!
//! ```rust,ignore
//! use customer_etl::{pipeline, DbConfig, PostgresSink, RunOptions};
//!
//! let config = DbConfig::from_env()?;
//! let mut sink = PostgresSink::new(&config);
//! let report = pipeline::run("data/customer_shopping_behavior.csv".as_ref(), &RunOptions::default(), &mut sink).await?;
//! println!("Loaded {} rows into {}", report.rows_written, report.table);
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::error::PipelineResult;
use crate::models::Dataset;
use crate::parser::{read_csv_file, ReadOptions};
use crate::sink::{TableSink, DEFAULT_TABLE};
use crate::transform::transform;

/// Rows shown in the debug sample log.
const SAMPLE_ROWS: usize = 5;

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Destination table, replaced on every run.
    pub table: String,
    /// Source file parsing options.
    pub read: ReadOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            read: ReadOptions::default(),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub table: String,
    pub rows_written: u64,
    pub columns: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Read `input` and apply every transform stage, without loading.
pub fn prepare(input: &Path, read: ReadOptions) -> PipelineResult<Dataset> {
    let raw = read_csv_file(input, read)?;
    let dataset = transform(raw);

    info!(columns = ?dataset.column_names(), "Transformed dataset");
    if let Ok(sample) = serde_json::to_string(&dataset.head(SAMPLE_ROWS)) {
        debug!(%sample, "Sample rows");
    }
    Ok(dataset)
}

/// Run the full pipeline and replace `options.table` in `sink`.
pub async fn run<S>(input: &Path, options: &RunOptions, sink: &mut S) -> PipelineResult<RunReport>
where
    S: TableSink + ?Sized,
{
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("etl_run", %run_id);
    execute(run_id, input, options, sink).instrument(span).await
}

async fn execute<S>(
    run_id: Uuid,
    input: &Path,
    options: &RunOptions,
    sink: &mut S,
) -> PipelineResult<RunReport>
where
    S: TableSink + ?Sized,
{
    let started_at = Utc::now();
    info!(input = %input.display(), table = %options.table, "ETL run started");

    let dataset = prepare(input, options.read)?;
    let rows_written = sink.replace_table(&options.table, &dataset).await?;

    let report = RunReport {
        run_id,
        table: options.table.clone(),
        rows_written,
        columns: dataset.column_names().into_iter().map(String::from).collect(),
        started_at,
        finished_at: Utc::now(),
    };
    info!(rows = report.rows_written, "ETL finished successfully");
    Ok(report)
}
