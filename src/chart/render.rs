//! Renders a [`ChartSpec`] as a standalone Plotly page.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::types::{Anchor, AnnotationMarker, Axis, ChartSpec, RangePreset, RangeStep, Series, StepMode};

const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

// ---------------------------------------------------------------------------
// Plotly figure schema (the subset this chart uses)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Figure<'a> {
    data: Vec<Trace<'a>>,
    layout: Layout<'a>,
}

#[derive(Debug, Serialize)]
struct Trace<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    name: &'a str,
    x: &'a [NaiveDate],
    /// `None` serializes as `null`, which Plotly draws as a gap.
    y: &'a [Option<f64>],
    yaxis: &'static str,
    line: Line<'a>,
}

#[derive(Debug, Serialize)]
struct Line<'a> {
    color: &'a str,
    width: f64,
}

#[derive(Debug, Serialize)]
struct Title<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Legend {
    orientation: &'static str,
}

#[derive(Debug, Serialize)]
struct Layout<'a> {
    title: Title<'a>,
    hovermode: &'static str,
    legend: Legend,
    xaxis: XAxis<'a>,
    yaxis: YAxis<'a>,
    yaxis2: YAxis<'a>,
    annotations: Vec<Annotation<'a>>,
}

#[derive(Debug, Serialize)]
struct XAxis<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: Title<'a>,
    rangeselector: RangeSelector<'a>,
    rangeslider: RangeSlider,
}

#[derive(Debug, Serialize)]
struct RangeSelector<'a> {
    buttons: Vec<RangeButton<'a>>,
}

#[derive(Debug, Serialize)]
struct RangeButton<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stepmode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct RangeSlider {
    visible: bool,
}

#[derive(Debug, Serialize)]
struct YAxis<'a> {
    title: Title<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    showgrid: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Annotation<'a> {
    x: NaiveDate,
    y: f64,
    xref: &'static str,
    yref: &'static str,
    text: &'a str,
    textangle: i32,
    showarrow: bool,
    yanchor: &'static str,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build the full HTML document for a chart.
pub fn render_html(chart: &ChartSpec) -> Result<String> {
    // No raw '<' may reach the inline script: "</script" or "<!--" in
    // annotation text would change how the HTML parser reads it.
    let figure_js = serde_json::to_string(&figure(chart))?.replace('<', "\\u003c");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_JS_URL}" charset="utf-8"></script>
<style>html, body {{ margin: 0; height: 100%; }} #chart {{ width: 100%; height: 100vh; }}</style>
</head>
<body>
<div id="chart"></div>
<script>
const figure = {figure_js};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#,
        title = escape_html(&chart.title),
    ))
}

/// The Plotly figure (`{data, layout}`) for a chart.
pub fn figure(chart: &ChartSpec) -> Figure<'_> {
    Figure {
        data: chart.series.iter().map(trace).collect(),
        layout: Layout {
            title: Title { text: &chart.title },
            hovermode: "x unified",
            legend: Legend { orientation: "h" },
            xaxis: XAxis {
                kind: "date",
                title: Title { text: &chart.x_axis.title },
                rangeselector: RangeSelector {
                    buttons: chart.x_axis.range_presets.iter().map(range_button).collect(),
                },
                rangeslider: RangeSlider { visible: chart.x_axis.range_slider },
            },
            yaxis: YAxis {
                title: Title { text: &chart.y_axis.title },
                overlaying: None,
                side: None,
                showgrid: None,
            },
            yaxis2: YAxis {
                title: Title { text: &chart.y_axis_secondary.title },
                overlaying: Some("y"),
                side: Some("right"),
                showgrid: Some(false),
            },
            annotations: chart.annotations.iter().map(annotation).collect(),
        },
    }
}

fn trace(series: &Series) -> Trace<'_> {
    Trace {
        kind: "scatter",
        mode: "lines",
        name: &series.name,
        x: &series.x,
        y: &series.y,
        yaxis: match series.axis {
            Axis::Primary => "y",
            Axis::Secondary => "y2",
        },
        line: Line { color: &series.color, width: series.line_width },
    }
}

fn range_button(preset: &RangePreset) -> RangeButton<'_> {
    let step = match preset.step {
        RangeStep::All => {
            return RangeButton { label: &preset.label, count: None, step: "all", stepmode: None };
        }
        RangeStep::Month => "month",
        RangeStep::Year => "year",
    };
    RangeButton {
        label: &preset.label,
        count: Some(preset.count),
        step,
        stepmode: Some(match preset.mode {
            StepMode::Backward => "backward",
            StepMode::ToDate => "todate",
        }),
    }
}

fn annotation(marker: &AnnotationMarker) -> Annotation<'_> {
    Annotation {
        x: marker.x,
        y: marker.y,
        xref: "x",
        yref: "paper",
        text: &marker.text,
        textangle: marker.text_angle,
        showarrow: marker.show_arrow,
        yanchor: match marker.anchor {
            Anchor::Bottom => "bottom",
            Anchor::Top => "top",
        },
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
