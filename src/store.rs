//! Record store: parses delimited text into rows of string fields.
//!
//! The column set is discovered from the header at load time. Every row holds a
//! (possibly empty) value for every discovered column.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// One record as a schema-less column -> value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Row(pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }

    /// Value of `column`, or `None` if the row has no such field.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deterministic identity of the row content.
    ///
    /// Fields are visited in sorted key order and every key and value is
    /// length-prefixed, so two rows share a key exactly when all their fields
    /// are equal.
    pub fn canonical_key(&self) -> String {
        let mut key = String::new();
        for (k, v) in self.0.iter() {
            key.push_str(&format!("{}:{}{}:{}", k.len(), k, v.len(), v));
        }
        key
    }

    fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }
}

/// All rows of one load plus the ordered column list.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn empty() -> Self {
        Dataset::default()
    }

    /// Builds a dataset, filling in an empty value for every column a row lacks.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                for column in columns.iter() {
                    row.0.entry(column.clone()).or_default();
                }
                row
            })
            .collect();
        Dataset { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses `raw` into a [`Dataset`], detecting the delimiter from the header line.
pub fn load(raw: &str) -> Result<Dataset> {
    load_with_delimiter(raw, None)
}

/// Parses `raw` into a [`Dataset`].
///
/// Fully empty lines are skipped. Input without any data row yields a dataset
/// with neither rows nor columns. On error nothing is returned, so a partially
/// parsed table never escapes.
pub fn load_with_delimiter(raw: &str, delimiter: Option<u8>) -> Result<Dataset> {
    if raw.trim().is_empty() {
        return Ok(Dataset::empty());
    }
    let start_time = Instant::now();
    let separator = delimiter.unwrap_or_else(|| detect_delimiter(raw));

    // Schema inference is disabled so every column arrives as a string.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_truncate_ragged_lines(true)
        })
        .into_reader_with_file_handle(Cursor::new(raw.as_bytes().to_vec()))
        .finish()?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    // Each column is materialised in its own task.
    let data: Vec<Vec<String>> = columns
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect::<std::result::Result<_, PolarsError>>()?;

    let rows: Vec<Row> = (0..df.height())
        .map(|ridx| {
            Row(columns
                .iter()
                .zip(data.iter())
                .map(|(name, values)| (name.clone(), values[ridx].clone()))
                .collect())
        })
        .filter(|row| !row.is_blank())
        .collect();

    if rows.is_empty() {
        debug!("Input has a header but no data rows");
        return Ok(Dataset::empty());
    }

    info!(
        "Parsed {} rows x {} columns in {}ms",
        rows.len(),
        columns.len(),
        start_time.elapsed().as_millis()
    );
    Ok(Dataset { columns, rows })
}

fn load_column(df: &DataFrame, name: &str) -> std::result::Result<Vec<String>, PolarsError> {
    let col = df.column(name)?.cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.map(str::to_string).unwrap_or_default())
        .collect())
}

/// Picks the most frequent candidate delimiter outside quotes on the first line.
pub fn detect_delimiter(raw: &str) -> u8 {
    let header = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for b in header.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes
            && let Some(pos) = DELIMITER_CANDIDATES.iter().position(|&c| c == b)
        {
            counts[pos] += 1;
        }
    }
    // Ties resolve to the earlier candidate, so ',' wins by default.
    let (best, count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |acc, (idx, &c)| if c > acc.1 { (idx, c) } else { acc });
    if count == 0 { b',' } else { DELIMITER_CANDIDATES[best] }
}
