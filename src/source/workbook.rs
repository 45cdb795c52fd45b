use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{AppError, Result};
use crate::source::{build_table, excel_serial_to_date, header_label, text_cell};
use crate::types::{Cell, Table};

/// Read one sheet of a workbook. The first row is the header.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(AppError::Config(format!(
            "sheet '{sheet}' not found in {} (available: {})",
            path.display(),
            names.join(", ")
        )));
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let header: Vec<String> = header.iter().map(|d| header_label(&d.to_string())).collect();

    Ok(build_table(header, rows.map(|r| r.iter().map(to_cell).collect::<Vec<_>>())))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Empty),
    }
}
