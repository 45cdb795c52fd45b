use chrono::{DateTime, TimeZone};

use crate::config::columns;
use crate::types::{
    Anchor, AnnotationMarker, Axis, ChartSpec, RangePreset, RangeStep, Record, Series, StepMode,
    XAxisSpec, YAxisSpec,
};

/// Layout of the run timestamp embedded in chart titles.
pub const TITLE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const PRIMARY_LINE_WIDTH: f64 = 1.5;
/// Buckets are a different kind of quantity; the heavier line keeps them apart.
const SECONDARY_LINE_WIDTH: f64 = 3.0;

struct SeriesDef {
    name: &'static str,
    color: &'static str,
    axis: Axis,
    value: fn(&Record) -> Option<f64>,
}

const SERIES: [SeriesDef; 5] = [
    SeriesDef { name: columns::FUEL, color: "#2e7d32", axis: Axis::Primary, value: fuel },
    SeriesDef { name: columns::AMMO, color: "#8d6e63", axis: Axis::Primary, value: ammo },
    SeriesDef { name: columns::STEEL, color: "#78909c", axis: Axis::Primary, value: steel },
    SeriesDef { name: columns::BAUXITE, color: "#ef6c00", axis: Axis::Primary, value: bauxite },
    SeriesDef { name: columns::REPAIR_BUCKETS, color: "#1565c0", axis: Axis::Secondary, value: repair_buckets },
];

fn fuel(r: &Record) -> Option<f64> {
    r.fuel
}
fn ammo(r: &Record) -> Option<f64> {
    r.ammo
}
fn steel(r: &Record) -> Option<f64> {
    r.steel
}
fn bauxite(r: &Record) -> Option<f64> {
    r.bauxite
}
fn repair_buckets(r: &Record) -> Option<f64> {
    r.repair_buckets
}

/// Describe the chart for one run.
///
/// Points keep input order and duplicate dates are plotted as-is. Markers
/// are only produced when an annotation column is configured, one per
/// record with non-blank annotation text.
pub fn build_chart<Tz>(
    records: &[Record],
    annotation_column: Option<&str>,
    generated_at: &DateTime<Tz>,
) -> ChartSpec
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let x: Vec<_> = records.iter().map(|r| r.date).collect();

    let series = SERIES
        .iter()
        .map(|def| Series {
            name: def.name.to_string(),
            x: x.clone(),
            y: records.iter().map(def.value).collect(),
            color: def.color.to_string(),
            axis: def.axis,
            line_width: match def.axis {
                Axis::Primary => PRIMARY_LINE_WIDTH,
                Axis::Secondary => SECONDARY_LINE_WIDTH,
            },
        })
        .collect();

    let annotations = match annotation_column {
        Some(_) => records.iter().filter_map(marker_for).collect(),
        None => Vec::new(),
    };

    ChartSpec {
        title: format!("資源推移 ({})", generated_at.format(TITLE_TIME_FORMAT)),
        series,
        x_axis: XAxisSpec {
            title: columns::DATE.to_string(),
            range_presets: range_presets(),
            range_slider: true,
        },
        y_axis: YAxisSpec {
            title: "資源".to_string(),
        },
        y_axis_secondary: YAxisSpec {
            title: columns::REPAIR_BUCKETS.to_string(),
        },
        annotations,
    }
}

fn marker_for(record: &Record) -> Option<AnnotationMarker> {
    let text = record.annotation.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(AnnotationMarker {
        x: record.date,
        y: 0.0,
        text: text.to_string(),
        text_angle: -90,
        anchor: Anchor::Bottom,
        show_arrow: false,
    })
}

fn range_presets() -> Vec<RangePreset> {
    let preset = |label: &str, count, step, mode| RangePreset {
        label: label.to_string(),
        count,
        step,
        mode,
    };
    vec![
        preset("1m", 1, RangeStep::Month, StepMode::Backward),
        preset("3m", 3, RangeStep::Month, StepMode::Backward),
        preset("6m", 6, RangeStep::Month, StepMode::Backward),
        preset("YTD", 1, RangeStep::Year, StepMode::ToDate),
        preset("1y", 1, RangeStep::Year, StepMode::Backward),
        preset("all", 1, RangeStep::All, StepMode::Backward),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn record(day: u32, note: Option<&str>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            fuel: Some(100.0 + day as f64),
            ammo: Some(50.0),
            steel: None,
            bauxite: Some(60.0),
            repair_buckets: Some(5.0),
            annotation: note.map(str::to_string),
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn five_series_with_buckets_on_secondary_axis() {
        let chart = build_chart(&[record(1, None), record(2, None)], None, &at(9));

        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["燃料", "弾薬", "鉄鋼", "ボーキ", "バケツ"]);

        for s in &chart.series {
            assert_eq!(s.x.len(), 2);
            assert_eq!(s.y.len(), 2);
            if s.name == "バケツ" {
                assert_eq!(s.axis, Axis::Secondary);
                assert!(s.line_width > PRIMARY_LINE_WIDTH);
            } else {
                assert_eq!(s.axis, Axis::Primary);
            }
        }
        assert_eq!(chart.series[0].y, vec![Some(101.0), Some(102.0)]);
        assert_eq!(chart.series[2].y, vec![None, None]);
    }

    #[test]
    fn x_axis_has_presets_and_slider() {
        let chart = build_chart(&[], None, &at(9));
        let labels: Vec<_> = chart.x_axis.range_presets.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["1m", "3m", "6m", "YTD", "1y", "all"]);
        assert_eq!(chart.x_axis.range_presets[3].mode, StepMode::ToDate);
        assert!(chart.x_axis.range_slider);
    }

    #[test]
    fn title_carries_run_timestamp() {
        let chart = build_chart(&[], None, &at(9));
        assert!(chart.title.contains("2024/06/01 09:00:00"));
    }

    #[test]
    fn empty_records_still_give_five_empty_series() {
        let chart = build_chart(&[], Some("note"), &at(9));
        assert_eq!(chart.series.len(), 5);
        assert!(chart.series.iter().all(|s| s.x.is_empty() && s.y.is_empty()));
        assert!(chart.annotations.is_empty());
    }

    #[test]
    fn one_marker_per_non_blank_annotation() {
        let records = [
            record(1, Some("resupply")),
            record(2, Some("")),
            record(3, Some("  ")),
            record(4, Some("event start")),
        ];
        let chart = build_chart(&records, Some("note"), &at(9));

        assert_eq!(chart.annotations.len(), 2);
        let m = &chart.annotations[0];
        assert_eq!(m.text, "resupply");
        assert_eq!(m.x, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(m.y, 0.0);
        assert_eq!(m.text_angle, -90);
        assert_eq!(m.anchor, Anchor::Bottom);
        assert!(!m.show_arrow);
    }

    #[test]
    fn no_annotation_column_means_no_markers() {
        let records = [record(1, Some("resupply"))];
        let chart = build_chart(&records, None, &at(9));
        assert!(chart.annotations.is_empty());
    }

    #[test]
    fn duplicate_dates_are_plotted_in_input_order() {
        let mut second = record(1, None);
        second.fuel = Some(7.0);
        let chart = build_chart(&[record(1, None), second], None, &at(9));
        assert_eq!(chart.series[0].x.len(), 2);
        assert_eq!(chart.series[0].y, vec![Some(101.0), Some(7.0)]);
    }

    #[test]
    fn rebuilding_changes_only_the_title() {
        let records = [record(1, Some("a")), record(2, None)];
        let first = build_chart(&records, Some("note"), &at(9));
        let second = build_chart(&records, Some("note"), &at(10));

        assert_ne!(first.title, second.title);
        assert_eq!(first.series, second.series);
        assert_eq!(first.annotations, second.annotations);
        assert_eq!(first.x_axis, second.x_axis);
    }
}
