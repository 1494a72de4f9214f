//! Error types for the customer ETL pipeline.
//!
//! Each pipeline component has its own error type:
//!
//! - [`ConfigError`] - Missing or malformed database settings
//! - [`SourceError`] - Reading or parsing the input CSV
//! - [`DatasetError`] - Broken dataset invariants (ragged or duplicate columns)
//! - [`SinkError`] - Writing the final table
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building the database configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is absent or empty.
    #[error("Environment variable {0} is not set")]
    Missing(String),

    /// Port is not a valid TCP port number.
    #[error("Invalid port '{value}' in {key}")]
    InvalidPort { key: String, value: String },
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading the source CSV file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input path does not exist.
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    /// Content is not valid delimited data.
    #[error("Invalid CSV{}: {message}", line_suffix(.line))]
    Parse { line: Option<u64>, message: String },
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(l) => format!(" at line {}", l),
        None => String::new(),
    }
}

impl SourceError {
    /// Shorthand for a parse error without a line number.
    pub fn parse(message: impl Into<String>) -> Self {
        SourceError::Parse {
            line: None,
            message: message.into(),
        }
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => format!("expected {} fields, found {}", expected_len, len),
            _ => err.to_string(),
        };
        SourceError::Parse { line, message }
    }
}

// =============================================================================
// Dataset Errors
// =============================================================================

/// Violations of the dataset shape invariants.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    /// A column does not have the same row count as the others.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Two columns share a name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while writing to the destination store.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Table name is not a plain SQL identifier.
    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    /// Connection, permission or statement failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::pipeline::run`] and the CLI.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source reading error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Sink write error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Writing CLI output failed.
    #[error("Output error: {0}")]
    Output(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
