use std::collections::HashMap;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Raw table — what the source reader hands over
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

/// One source row keyed by trimmed header label. Cells past the end of a
/// short row are simply absent.
pub type RawRow = HashMap<String, Cell>;

#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Header labels in source order.
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Table {
    pub fn has_column(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c == label)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One normalized log entry.
///
/// Resource quantities use `None` as the "not recorded" sentinel. A recorded
/// zero is `Some(0.0)` and is a real reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub fuel: Option<f64>,
    pub ammo: Option<f64>,
    pub steel: Option<f64>,
    pub bauxite: Option<f64>,
    pub repair_buckets: Option<f64>,
    /// `None` when no annotation column is configured; otherwise the cell
    /// text, possibly empty.
    pub annotation: Option<String>,
}

impl Record {
    /// A record counts once its fuel figure has been written down.
    pub fn is_valid(&self) -> bool {
        self.fuel.is_some()
    }
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<NaiveDate>,
    /// `None` points are gaps, never zero.
    pub y: Vec<Option<f64>>,
    pub color: String,
    pub axis: Axis,
    pub line_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStep {
    Month,
    Year,
    All,
}

/// Whether a preset window counts back from the newest point or snaps to
/// the start of the current step (year-to-date).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Backward,
    ToDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangePreset {
    pub label: String,
    pub count: u32,
    pub step: RangeStep,
    pub mode: StepMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XAxisSpec {
    pub title: String,
    pub range_presets: Vec<RangePreset>,
    pub range_slider: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YAxisSpec {
    pub title: String,
}

/// Which edge of the annotation text sits on its `y` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Bottom,
    Top,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMarker {
    pub x: NaiveDate,
    /// Vertical position as a fraction of the plot height; 0.0 is the baseline.
    pub y: f64,
    pub text: String,
    /// Degrees; -90 reads bottom-to-top.
    pub text_angle: i32,
    pub anchor: Anchor,
    pub show_arrow: bool,
}

/// Renderer-agnostic description of one chart artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub series: Vec<Series>,
    pub x_axis: XAxisSpec,
    pub y_axis: YAxisSpec,
    pub y_axis_secondary: YAxisSpec,
    pub annotations: Vec<AnnotationMarker>,
}
