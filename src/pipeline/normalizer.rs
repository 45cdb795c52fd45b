use chrono::NaiveDate;
use tracing::debug;

use crate::config::columns;
use crate::error::{AppError, Result};
use crate::source::excel_serial_to_date;
use crate::types::{Cell, Record, Table};

/// Text date layouts accepted in the date column. Single-digit months and
/// days parse too.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const RESOURCE_COLUMNS: [&str; 5] = [
    columns::FUEL,
    columns::AMMO,
    columns::STEEL,
    columns::BAUXITE,
    columns::REPAIR_BUCKETS,
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_read: usize,
    /// Rows dropped because the date cell was blank or not a date.
    pub undated: usize,
    /// Header label the date was read from.
    pub date_column: String,
}

/// Project a raw table onto the recognized schema.
///
/// Column problems are fatal and reported before any row is looked at:
/// no date column under either alias, a missing resource column, or a
/// configured annotation column that the source does not have. Blank or
/// non-numeric resource cells become the `None` sentinel; they are never
/// read as zero.
pub fn normalize(table: &Table, annotation_column: Option<&str>) -> Result<(Vec<Record>, NormalizeStats)> {
    let date_column = resolve_date_column(table)?;

    let missing: Vec<&str> = RESOURCE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Schema(format!(
            "resource columns missing from source: {}",
            missing.join(", ")
        )));
    }

    if let Some(name) = annotation_column {
        if !table.has_column(name) {
            return Err(AppError::Config(format!(
                "annotation column '{name}' not found in source (columns: {})",
                table.columns.join(", ")
            )));
        }
    }

    let mut stats = NormalizeStats {
        rows_read: table.rows.len(),
        date_column: date_column.to_string(),
        ..Default::default()
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let Some(date) = row.get(date_column).and_then(date_value) else {
            stats.undated += 1;
            continue;
        };

        records.push(Record {
            date,
            fuel: row.get(columns::FUEL).and_then(quantity),
            ammo: row.get(columns::AMMO).and_then(quantity),
            steel: row.get(columns::STEEL).and_then(quantity),
            bauxite: row.get(columns::BAUXITE).and_then(quantity),
            repair_buckets: row.get(columns::REPAIR_BUCKETS).and_then(quantity),
            annotation: annotation_column.map(|c| row.get(c).map(annotation_text).unwrap_or_default()),
        });
    }

    debug!(
        rows_read = stats.rows_read,
        undated = stats.undated,
        date_column = %stats.date_column,
        "normalized {} rows",
        records.len(),
    );

    Ok((records, stats))
}

/// Canonical label wins when a source carries both spellings.
fn resolve_date_column(table: &Table) -> Result<&'static str> {
    columns::DATE_ALIASES
        .iter()
        .copied()
        .find(|alias| table.has_column(alias))
        .ok_or_else(|| {
            AppError::Schema(format!(
                "no date column: expected '{}' or '{}' (columns: {})",
                columns::DATE,
                columns::DATE_LEGACY,
                table.columns.join(", ")
            ))
        })
}

fn date_value(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let day = s.trim().split([' ', 'T']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

fn quantity(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
        Cell::Text(s) => {
            let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
            digits.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        Cell::Empty | Cell::Date(_) => None,
    }
}

fn annotation_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Date(d) => d.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::build_table;

    fn text(s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        build_table(
            header.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|c| text(c)).collect::<Vec<_>>()),
        )
    }

    const HEADER: [&str; 6] = ["日付", "燃料", "弾薬", "鉄鋼", "ボーキ", "バケツ"];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn both_date_aliases_give_identical_records() {
        let rows: &[&[&str]] = &[
            &["2024-01-01", "100", "50", "80", "60", "5"],
            &["2024/1/2", "", "40", "70", "55", "5"],
        ];
        let mut legacy_header = HEADER;
        legacy_header[0] = "#日付";

        let (canonical, _) = normalize(&table(&HEADER, rows), None).unwrap();
        let (legacy, stats) = normalize(&table(&legacy_header, rows), None).unwrap();

        assert_eq!(canonical, legacy);
        assert_eq!(stats.date_column, "#日付");
        assert_eq!(canonical[1].date, date(2024, 1, 2));
    }

    #[test]
    fn missing_date_column_is_schema_error() {
        let t = table(&["day", "燃料", "弾薬", "鉄鋼", "ボーキ", "バケツ"], &[]);
        assert!(matches!(normalize(&t, None), Err(AppError::Schema(_))));
    }

    #[test]
    fn missing_resource_column_is_schema_error() {
        let t = table(&["日付", "燃料", "弾薬", "鉄鋼", "ボーキ"], &[]);
        let err = normalize(&t, None).unwrap_err();
        assert!(err.to_string().contains("バケツ"));
    }

    #[test]
    fn absent_annotation_column_is_config_error() {
        let t = table(&HEADER, &[&["2024-01-01", "1", "1", "1", "1", "1"]]);
        assert!(matches!(normalize(&t, Some("note")), Err(AppError::Config(_))));
    }

    #[test]
    fn blank_cells_are_sentinel_and_zero_is_recorded() {
        let t = table(&HEADER, &[&["2024-01-01", "0", "", "1,200", "n/a", "3"]]);
        let (records, _) = normalize(&t, None).unwrap();

        assert_eq!(records[0].fuel, Some(0.0));
        assert_eq!(records[0].ammo, None);
        assert_eq!(records[0].steel, Some(1200.0));
        assert_eq!(records[0].bauxite, None);
        assert_eq!(records[0].repair_buckets, Some(3.0));
        assert!(records[0].annotation.is_none());
    }

    #[test]
    fn undated_rows_are_counted_not_kept() {
        let t = table(
            &HEADER,
            &[
                &["2024-01-01", "1", "1", "1", "1", "1"],
                &["", "1", "1", "1", "1", "1"],
                &["someday", "1", "1", "1", "1", "1"],
            ],
        );
        let (records, stats) = normalize(&t, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.undated, 2);
    }

    #[test]
    fn workbook_cells_are_understood() {
        let t = build_table(
            HEADER.iter().map(|h| h.to_string()).chain(["note".to_string()]).collect(),
            vec![vec![
                Cell::Number(45292.0),
                Cell::Number(100.0),
                Cell::Number(50.0),
                Cell::Number(80.0),
                Cell::Number(60.0),
                Cell::Number(5.0),
                Cell::Number(7.0),
            ]],
        );
        let (records, _) = normalize(&t, Some("note")).unwrap();
        assert_eq!(records[0].date, date(2024, 1, 1));
        assert_eq!(records[0].annotation.as_deref(), Some("7"));
    }

    #[test]
    fn annotation_text_is_carried_when_configured() {
        let mut header: Vec<&str> = HEADER.to_vec();
        header.push("note");
        let t = table(
            &header,
            &[
                &["2024-01-01", "1", "1", "1", "1", "1", "resupply"],
                &["2024-01-02", "1", "1", "1", "1", "1", ""],
                &["2024-01-03", "1", "1", "1", "1", "1"],
            ],
        );
        let (records, _) = normalize(&t, Some("note")).unwrap();
        assert_eq!(records[0].annotation.as_deref(), Some("resupply"));
        assert_eq!(records[1].annotation.as_deref(), Some(""));
        assert_eq!(records[2].annotation.as_deref(), Some(""));
    }

    #[test]
    fn date_text_with_time_part() {
        assert_eq!(parse_date_text("2024-03-05 12:00:00"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date_text("2024-03-05T12:00:00"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date_text("2024.3.5"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date_text("March 5"), None);
    }
}
