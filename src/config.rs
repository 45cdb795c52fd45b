use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{AppError, Result};

/// Sheet read when none is given.
pub const DEFAULT_SHEET: &str = "資源メモ";

/// Artifact path written when none is given.
pub const DEFAULT_OUTPUT: &str = "material_viewer.html";

/// How often the armed scheduler wakes to compare the clock against `next_fire_at`.
pub const SCHEDULER_TICK: Duration = Duration::from_secs(1);

/// Longest accepted refresh interval (100 years).
pub const MAX_INTERVAL_HOURS: f64 = 24.0 * 365.0 * 100.0;

/// Source header labels recognized by the normalizer.
pub mod columns {
    /// Canonical date column.
    pub const DATE: &str = "日付";
    /// Legacy spelling of the date column found in older logs.
    pub const DATE_LEGACY: &str = "#日付";
    pub const FUEL: &str = "燃料";
    pub const AMMO: &str = "弾薬";
    pub const STEEL: &str = "鉄鋼";
    pub const BAUXITE: &str = "ボーキ";
    pub const REPAIR_BUCKETS: &str = "バケツ";

    /// Date aliases in lookup order.
    pub const DATE_ALIASES: [&str; 2] = [DATE, DATE_LEGACY];
}

/// Builds an interactive resource chart from a resource log and keeps it fresh.
#[derive(Debug, Clone, Parser)]
#[command(name = "material-viewer", version, about)]
pub struct Config {
    /// Resource log: a workbook (.xlsx, .xlsm, .xlsb, .xls, .ods) or a CSV export
    #[arg(env = "MATERIAL_SOURCE")]
    pub source: PathBuf,

    /// Sheet holding the log (ignored for CSV sources)
    #[arg(long, env = "MATERIAL_SHEET", default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Chart artifact path, replaced on every run
    #[arg(long, env = "MATERIAL_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Refresh interval in hours; 0 renders once and exits
    #[arg(long, env = "MATERIAL_INTERVAL_HOURS", default_value_t = 0.0)]
    pub interval_hours: f64,

    /// Free-text column rendered as vertical chart annotations
    #[arg(long, env = "MATERIAL_ANNOTATION_COLUMN")]
    pub annotation_column: Option<String>,

    /// tracing filter directive
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Refresh interval as a `Duration`. Zero means run once.
    pub fn refresh_interval(&self) -> Result<Duration> {
        if !self.interval_hours.is_finite() || self.interval_hours < 0.0 {
            return Err(AppError::Config(format!(
                "refresh interval must be a non-negative number of hours, got {}",
                self.interval_hours
            )));
        }
        if self.interval_hours > MAX_INTERVAL_HOURS {
            return Err(AppError::Config(format!(
                "refresh interval of {} hours exceeds the maximum of {MAX_INTERVAL_HOURS} hours",
                self.interval_hours
            )));
        }
        Duration::try_from_secs_f64(self.interval_hours * 3600.0).map_err(|e| {
            AppError::Config(format!(
                "refresh interval of {} hours is out of range: {e}",
                self.interval_hours
            ))
        })
    }

    /// Configured annotation column. A blank name counts as not configured.
    pub fn annotation_column(&self) -> Option<&str> {
        self.annotation_column
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
