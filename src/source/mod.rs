//! Tabular source adapters. Each one turns a file into a header row plus
//! loosely-typed cells; all interpretation happens in the pipeline.

pub mod delimited;
pub mod workbook;

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::{Cell, RawRow, Table};

/// Read the addressed sheet of a workbook or CSV export.
pub fn read_table(path: &Path, sheet: &str) -> Result<Table> {
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "source {} does not exist or is not a file",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read_sheet(path, sheet),
        "csv" => {
            debug!(sheet, "CSV source is a single sheet; sheet name not checked");
            delimited::read_csv(path)
        }
        other => Err(AppError::Config(format!(
            "unsupported source format '{other}' for {} (expected a workbook or .csv)",
            path.display()
        ))),
    }
}

/// Assemble a table from a header row and cell rows. Blank header labels are
/// dropped; for duplicated labels the leftmost column wins.
pub(crate) fn build_table<I>(header: Vec<String>, rows: I) -> Table
where
    I: IntoIterator<Item = Vec<Cell>>,
{
    let rows = rows
        .into_iter()
        .map(|cells| {
            let mut row = RawRow::with_capacity(header.len());
            for (label, cell) in header.iter().zip(cells) {
                if label.is_empty() {
                    continue;
                }
                row.entry(label.clone()).or_insert(cell);
            }
            row
        })
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(header.len());
    for label in header {
        if !label.is_empty() && !columns.contains(&label) {
            columns.push(label);
        }
    }

    Table { columns, rows }
}

pub(crate) fn header_label(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Text cell, with whitespace-only text folded into `Cell::Empty`.
pub(crate) fn text_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(trimmed.to_string())
    }
}

/// Spreadsheet serial day number to a calendar date (1900 date system,
/// epoch 1899-12-30). The time-of-day fraction is discarded.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(chrono::Days::new(serial.floor() as u64))
}
