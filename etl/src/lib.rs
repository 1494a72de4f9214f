//! # Customer ETL - clean, enrich and load customer shopping data
//!
//! Reads a customer-shopping CSV export, normalizes and enriches it, and
//! replaces a PostgreSQL table with the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌──────────┐     ┌─────────────┐     ┌──────────┐
//! │ CSV File │────▶│  Parser  │────▶│  Transform  │────▶│   Sink   │
//! │          │     │ (typed)  │     │ (4 stages)  │     │ (replace)│
//! └──────────┘     └──────────┘     └─────────────┘     └──────────┘
//! ```
//!
//! Transform stages: normalize → impute → features → prune.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use customer_etl::{pipeline, MemorySink, RunOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut sink = MemorySink::new();
//!     let report = pipeline::run("customers.csv".as_ref(), &RunOptions::default(), &mut sink)
//!         .await
//!         .unwrap();
//!     println!("Loaded {} rows", report.rows_written);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per component
//! - [`models`] - `Dataset`, `Column`, `Value`
//! - [`parser`] - CSV reading with encoding detection and type inference
//! - [`transform`] - Normalization, imputation, features, pruning
//! - [`sink`] - PostgreSQL and in-memory destinations
//! - [`config`] - Database settings from the environment
//! - [`pipeline`] - End-to-end orchestration
//! - [`logging`] - Tracing setup

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Stages
pub mod parser;
pub mod sink;
pub mod transform;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::DbConfig;

pub use error::{ConfigError, DatasetError, PipelineError, SinkError, SourceError};

pub use models::{Column, Dataset, Value};

pub use parser::{parse_csv_str, read_csv_file, ReadOptions};

pub use transform::{
    add_features, drop_unused, impute_rating, normalize_columns, transform, AGE_GROUP_LABELS,
    FREQUENCY_DAYS,
};

pub use sink::{MemorySink, PostgresSink, SqlType, TableSink, DEFAULT_TABLE};

pub use pipeline::{prepare, run, RunOptions, RunReport};
