use std::path::Path;

use crate::error::Result;
use crate::source::{build_table, header_label, text_cell};
use crate::types::Table;

/// Read a CSV export. Every cell arrives as text; numbers and dates are
/// interpreted by the normalizer.
pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(header_label).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(build_table(header, rows))
}
