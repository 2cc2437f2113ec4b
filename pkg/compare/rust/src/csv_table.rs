// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Result-file CSV parsing.
//!
//! Experiment outputs are plain comma-separated files with an optional header
//! row. Parsing never fails: ragged rows are kept as they are and cells that
//! are not numbers are preserved as text so label columns survive.
//!
//! When the header names a time column (`t` or `time`) that is not already
//! first, it is swapped into position 0 so plotting code can always treat
//! column 0 as the x axis. `colmap` records the permutation so tables can be
//! shown in the file's own column order.

use serde::Serialize;
use tracing::{debug, warn};

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Empty;
        }
        match raw.parse::<f64>() {
            Ok(value) if !value.is_nan() => Cell::Number(value),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

/// One column of a table, transposed for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Position in the (possibly permuted) table.
    pub index: usize,
    pub label: Option<String>,
    /// Missing and non-numeric cells are `NaN`.
    pub values: Vec<f64>,
    /// Smallest finite value, if any.
    pub min: Option<f64>,
    /// Largest finite value, if any.
    pub max: Option<f64>,
}

impl Column {
    /// `max - min`, or 0 when the column holds no finite values.
    pub fn range(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max - min,
            _ => 0.0,
        }
    }
}

/// Parsed CSV file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsvTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
    /// `colmap[i]` is the original index of the column now at position `i`.
    pub colmap: Vec<usize>,
}

/// Split CSV text into trimmed string records, skipping comments and blank
/// lines. Records may differ in length.
pub fn read_records(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => records.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(error = %e, "Skipping unreadable CSV record"),
        }
    }
    records
}

/// Parse raw CSV text.
pub fn parse_csv(text: &str) -> CsvTable {
    let mut raw_rows = read_records(text);

    let mut rows: Vec<Vec<Cell>> = raw_rows
        .iter()
        .map(|r| r.iter().map(|c| Cell::parse(c)).collect())
        .collect();

    let mut header = None;
    if rows.len() >= 2 && is_header_row(&rows[0], &rows[1]) {
        rows.remove(0);
        header = Some(std::mem::take(&mut raw_rows[0]));
    }

    let width = header
        .as_ref()
        .map(Vec::len)
        .or_else(|| rows.first().map(Vec::len))
        .unwrap_or(0);
    let mut colmap: Vec<usize> = (0..width).collect();

    if let Some(ref mut names) = header {
        if let Some(k) = names.iter().position(|n| is_time_label(n)).filter(|&k| k > 0) {
            debug!(column = k, name = %names[k], "Moving time column to position 0");
            names.swap(0, k);
            colmap.swap(0, k);
            for row in rows.iter_mut().filter(|r| r.len() > k) {
                row.swap(0, k);
            }
        }
    }

    CsvTable {
        header,
        rows,
        colmap,
    }
}

fn is_time_label(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case("t") || name.eq_ignore_ascii_case("time")
}

/// The first two cells of a row, or fewer when the row is narrower.
fn leading_cells(row: &[Cell]) -> &[Cell] {
    &row[..row.len().min(2)]
}

fn is_header_row(first: &[Cell], second: &[Cell]) -> bool {
    let first = leading_cells(first);
    let second = leading_cells(second);
    !first.is_empty()
        && !second.is_empty()
        && first.iter().all(|c| !c.is_numeric())
        && second.iter().all(Cell::is_numeric)
}

impl CsvTable {
    /// Width of the table, taken from the first data row like the plotting
    /// code expects.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn has_time_swap(&self) -> bool {
        self.colmap.iter().enumerate().any(|(i, &c)| i != c)
    }

    /// Label of column `index` in the current (permuted) order.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.header.as_ref()?.get(index).map(String::as_str)
    }

    /// Restore a row to the file's own column order.
    ///
    /// Rows too short to have been permuted are returned unchanged. Cells past
    /// the header width are never moved.
    pub fn original_order<T: Clone>(&self, row: &[T]) -> Vec<T> {
        let mut out = row.to_vec();
        if !self.has_time_swap() {
            return out;
        }
        let n = row.len().min(self.colmap.len());
        if self.colmap[..n].iter().any(|&c| c >= n) {
            return out;
        }
        for (i, value) in row[..n].iter().enumerate() {
            out[self.colmap[i]] = value.clone();
        }
        out
    }

    /// Transpose into columns using the width of the first data row.
    pub fn columns(&self) -> Vec<Column> {
        (0..self.width())
            .map(|index| {
                let values: Vec<f64> = self
                    .rows
                    .iter()
                    .map(|r| r.get(index).and_then(Cell::as_f64).unwrap_or(f64::NAN))
                    .collect();
                let (min, max) = values
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .fold((None, None), |(min, max), v| {
                        (
                            Some(min.map_or(v, |m: f64| m.min(v))),
                            Some(max.map_or(v, |m: f64| m.max(v))),
                        )
                    });
                Column {
                    index,
                    label: self.label(index).map(str::to_string),
                    values,
                    min,
                    max,
                }
            })
            .collect()
    }

    /// Values of the first column as display strings; used for key files.
    pub fn first_column_text(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.first())
            .map(Cell::to_string)
            .collect()
    }
}
