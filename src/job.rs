use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::chart::{build_chart, render_html};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{normalize, retain_recorded};
use crate::source::read_table;

/// What one refresh run read, kept, and wrote.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub started_at: DateTime<Local>,
    pub rows_read: usize,
    pub undated: usize,
    /// Dated rows dropped because fuel was not recorded.
    pub excluded: usize,
    pub valid_records: usize,
    pub markers: usize,
    pub output: PathBuf,
}

/// read → normalize → filter → build chart → replace artifact.
///
/// Any failure before the final step leaves the previous artifact as it was.
#[derive(Debug, Clone)]
pub struct RefreshJob {
    source: PathBuf,
    sheet: String,
    output: PathBuf,
    annotation_column: Option<String>,
}

impl RefreshJob {
    pub fn new(
        source: PathBuf,
        sheet: String,
        output: PathBuf,
        annotation_column: Option<String>,
    ) -> Self {
        Self { source, sheet, output, annotation_column }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.source.clone(),
            cfg.sheet.clone(),
            cfg.output.clone(),
            cfg.annotation_column().map(str::to_string),
        )
    }

    pub fn run(&self) -> Result<JobReport> {
        let started_at = Local::now();
        let timer = Instant::now();
        let annotation_column = self.annotation_column.as_deref();

        let table = read_table(&self.source, &self.sheet)?;
        debug!(columns = ?table.columns, rows = table.rows.len(), "source read");

        let (records, stats) = normalize(&table, annotation_column)?;
        let dated = records.len();

        let records = retain_recorded(records);
        let excluded = dated - records.len();
        debug!(excluded, "dropped rows without a fuel figure");

        let chart = build_chart(&records, annotation_column, &started_at);
        let html = render_html(&chart)?;
        write_atomic(&self.output, html.as_bytes())?;

        let report = JobReport {
            started_at,
            rows_read: stats.rows_read,
            undated: stats.undated,
            excluded,
            valid_records: records.len(),
            markers: chart.annotations.len(),
            output: self.output.clone(),
        };

        info!(
            rows_read = report.rows_read,
            valid = report.valid_records,
            excluded = report.excluded,
            undated = report.undated,
            markers = report.markers,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Chart written to {}",
            report.output.display(),
        );

        Ok(report)
    }
}

/// Replace `path` with `bytes` in one step: write a sibling temp file, then
/// rename it over the target. Readers see either the old or the new file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
