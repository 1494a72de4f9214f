//! CSV source reader with encoding auto-detection and column type inference.
//!
//! Produces a [`Dataset`] whose column names match the header row exactly.
//! No name cleanup happens here; see [`crate::transform::normalize`].

use std::path::Path;

use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::models::{Column, Dataset, Value};

/// Cell contents treated as missing, after trimming.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Options for reading a source file.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Field delimiter (ASCII).
    pub delimiter: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ReadOptions {
    /// Options with a user-supplied delimiter. Rejects non-ASCII characters.
    pub fn with_delimiter(delimiter: char) -> SourceResult<Self> {
        if !delimiter.is_ascii() {
            return Err(SourceError::parse(format!(
                "delimiter '{}' is not an ASCII character",
                delimiter
            )));
        }
        Ok(Self {
            delimiter: delimiter as u8,
        })
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the detected encoding.
///
/// Unknown encodings fall back to UTF-8; bytes that are not valid UTF-8
/// then fail with [`SourceError::Parse`].
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        // WHATWG maps ISO-8859-1 labels onto windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|e| {
            SourceError::parse(format!(
                "content is not valid {} (invalid byte at offset {})",
                encoding,
                e.utf8_error().valid_up_to()
            ))
        })?,
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Read a CSV file into a dataset.
///
/// Fails with [`SourceError::NotFound`] if the path does not exist and
/// [`SourceError::Parse`] if the content is not well-formed delimited data.
pub fn read_csv_file<P: AsRef<Path>>(path: P, options: ReadOptions) -> SourceResult<Dataset> {
    let path = path.as_ref();
    info!(path = %path.display(), "Reading CSV");

    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    debug!(%encoding, "Detected encoding");

    let content = decode_content(&bytes, &encoding)?;
    let dataset = parse_csv_str(&content, options)?;

    info!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "Read source file"
    );
    Ok(dataset)
}

/// Parse CSV text into a dataset.
pub fn parse_csv_str(content: &str, options: ReadOptions) -> SourceResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(SourceError::parse("no header row"));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Dataset::from_columns(columns).map_err(|e| SourceError::parse(e.to_string()))
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Type a whole column at once: all-integer, then all-numeric, else text.
fn infer_column(cells: Vec<String>) -> Vec<Value> {
    let present: Vec<&str> = cells
        .iter()
        .filter(|c| !is_missing(c))
        .map(|c| c.trim())
        .collect();

    if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c.trim().parse::<i64>() {
                Ok(i) if !is_missing(c) => Value::Int(i),
                _ => Value::Missing,
            })
            .collect();
    }

    if present.iter().all(|c| c.parse::<f64>().is_ok_and(f64::is_finite)) {
        return cells
            .iter()
            .map(|c| match c.trim().parse::<f64>() {
                Ok(f) if !is_missing(c) => Value::Float(f),
                _ => Value::Missing,
            })
            .collect();
    }

    cells
        .into_iter()
        .map(|c| if is_missing(&c) { Value::Missing } else { Value::Text(c) })
        .collect()
}
