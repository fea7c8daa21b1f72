//! Report outputs for one aligned log: the merged table, a line chart of
//! the selected fields against time, and a styled tabular export with a
//! value-magnitude color gradient.

use crate::error::{PipelineError, Result};
use crate::types::AlignedTable;
use serde::Serialize;
use std::fs;
use std::path::Path;

const CHART_WIDTH: f64 = 1000.0;
const CHART_HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const AXIS_TICKS: usize = 5;

const SERIES_COLORS: &[&str] = &["#1f77b4", "#d62728", "#2ca02c", "#9467bd", "#ff7f0e"];

/// Write the unstyled merged table as CSV. The caller registers the file
/// as a transient artifact.
pub fn write_merged_csv(table: &AlignedTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(table.columns.len());
        record.push(row.timestamp_s.to_string());
        for value in &row.values {
            record.push(value.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush().map_err(PipelineError::Io)?;
    Ok(())
}

pub fn write_chart_svg(table: &AlignedTable, title: &str, path: &Path) -> Result<()> {
    let svg = render_chart_svg(table, title);
    fs::write(path, svg)?;
    Ok(())
}

pub fn write_styled_html(table: &AlignedTable, source_name: &str, path: &Path) -> Result<()> {
    let html = render_styled_html(table, source_name)?;
    fs::write(path, html)?;
    Ok(())
}

/// Render the aligned table as a self-contained SVG line chart, one series
/// per value column.
pub fn render_chart_svg(table: &AlignedTable, title: &str) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    ));
    svg.push_str(&format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"24\" font-size=\"18\" text-anchor=\"middle\">{}</text>\n",
        CHART_WIDTH / 2.0,
        escape_xml(title)
    ));

    let plot_w = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    if table.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\" fill=\"#777\">\
             no samples</text>\n",
            MARGIN_LEFT + plot_w / 2.0,
            MARGIN_TOP + plot_h / 2.0
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let (t_min, t_max) = min_max(table.rows.iter().map(|r| r.timestamp_s));
    let (v_min, v_max) = min_max(table.rows.iter().flat_map(|r| r.values.iter().copied()));
    let t_span = span_or_unit(t_max - t_min);
    let v_span = span_or_unit(v_max - v_min);

    let x = |t: f64| MARGIN_LEFT + (t - t_min) / t_span * plot_w;
    let y = |v: f64| MARGIN_TOP + plot_h - (v - v_min) / v_span * plot_h;

    // Gridlines and tick labels
    for i in 0..=AXIS_TICKS {
        let frac = i as f64 / AXIS_TICKS as f64;
        let tx = MARGIN_LEFT + frac * plot_w;
        let ty = MARGIN_TOP + plot_h - frac * plot_h;
        svg.push_str(&format!(
            "<line x1=\"{tx}\" y1=\"{}\" x2=\"{tx}\" y2=\"{}\" stroke=\"#eee\"/>\n",
            MARGIN_TOP,
            MARGIN_TOP + plot_h
        ));
        svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{ty}\" x2=\"{}\" y2=\"{ty}\" stroke=\"#eee\"/>\n",
            MARGIN_LEFT,
            MARGIN_LEFT + plot_w
        ));
        svg.push_str(&format!(
            "<text x=\"{tx}\" y=\"{}\" font-size=\"11\" text-anchor=\"middle\">{:.1}</text>\n",
            MARGIN_TOP + plot_h + 18.0,
            t_min + frac * t_span
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\">{:.1}</text>\n",
            MARGIN_LEFT - 8.0,
            ty + 4.0,
            v_min + frac * v_span
        ));
    }

    // Axes
    svg.push_str(&format!(
        "<line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#333\"/>\n\
         <line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#333\"/>\n",
        l = MARGIN_LEFT,
        r = MARGIN_LEFT + plot_w,
        t = MARGIN_TOP,
        b = MARGIN_TOP + plot_h
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\">Time (seconds)</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        CHART_HEIGHT - 10.0
    ));

    // One polyline per value column, with a legend entry
    for (series, name) in table.columns.iter().skip(1).enumerate() {
        let color = SERIES_COLORS[series % SERIES_COLORS.len()];
        let points: Vec<String> = table
            .rows
            .iter()
            .map(|row| format!("{:.2},{:.2}", x(row.timestamp_s), y(row.values[series])))
            .collect();
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
            color,
            points.join(" ")
        ));

        let ly = MARGIN_TOP + 16.0 * series as f64;
        svg.push_str(&format!(
            "<line x1=\"{lx}\" y1=\"{ly}\" x2=\"{}\" y2=\"{ly}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            MARGIN_LEFT + plot_w + 34.0,
            color,
            lx = MARGIN_LEFT + plot_w + 10.0,
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"12\">{}</text>\n",
            MARGIN_LEFT + plot_w + 40.0,
            ly + 4.0,
            escape_xml(name)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    source: &'a str,
    rows: usize,
    columns: &'a [String],
    duration_s: f64,
}

/// Render the styled tabular export: the merged table as a self-contained
/// HTML document with a per-column background gradient on the value
/// columns (summary data embedded as JSON).
pub fn render_styled_html(table: &AlignedTable, source_name: &str) -> Result<String> {
    let duration_s = match (table.rows.first(), table.rows.last()) {
        (Some(first), Some(last)) => last.timestamp_s - first.timestamp_s,
        _ => 0.0,
    };
    let summary = ReportSummary {
        source: source_name,
        rows: table.len(),
        columns: &table.columns,
        duration_s,
    };
    let json = serde_json::to_string(&summary)
        .map_err(|err| PipelineError::Export(format!("summary encoding failed: {}", err)))?;

    // Per-column value ranges over the value columns only
    let series_count = table.columns.len().saturating_sub(1);
    let ranges: Vec<(f64, f64)> = (0..series_count)
        .map(|i| min_max(table.rows.iter().map(|r| r.values[i])))
        .collect();

    let mut thead = String::from("<tr>");
    for column in &table.columns {
        thead.push_str(&format!("<th>{}</th>", escape_xml(column)));
    }
    thead.push_str("</tr>");

    let mut tbody = String::new();
    for row in &table.rows {
        tbody.push_str("<tr>");
        tbody.push_str(&format!("<td class=\"num\">{:.3}</td>", row.timestamp_s));
        for (i, value) in row.values.iter().enumerate() {
            let (lo, hi) = ranges[i];
            let ratio = (value - lo) / span_or_unit(hi - lo);
            tbody.push_str(&format!(
                "<td class=\"num\" style=\"background:{}\">{:.3}</td>",
                gradient_color(ratio),
                value
            ));
        }
        tbody.push_str("</tr>\n");
    }

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 16px; }
  .summary { display: flex; gap: 12px; flex-wrap: wrap; font-size: 14px; margin-bottom: 12px; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  table { border-collapse: collapse; }
  th, td { border: 1px solid #ddd; padding: 4px 10px; font-size: 13px; }
  th { position: sticky; top: 0; background: white; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<div class="summary" id="summary"></div>
<table>
<thead>__THEAD__</thead>
<tbody>
__TBODY__</tbody>
</table>
<script>
const DATA = __DATA__;
const el = document.getElementById("summary");
el.innerHTML = `
  <span class="pill">source: <b>${DATA.source}</b></span>
  <span class="pill">rows: <b>${DATA.rows}</b></span>
  <span class="pill">duration: <b>${DATA.duration_s.toFixed(1)} s</b></span>
  <span class="pill">columns: <b>${DATA.columns.join(", ")}</b></span>
`;
</script>
</body>
</html>
"#;

    Ok(TEMPLATE
        .replace("__TITLE__", &escape_xml(source_name))
        .replace("__THEAD__", &thead)
        .replace("__TBODY__", &tbody)
        .replace("__DATA__", &json))
}

/// Map a 0..=1 magnitude onto a cool-to-warm color ramp.
fn gradient_color(ratio: f64) -> String {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let ratio = ratio.clamp(0.0, 1.0);
    let (from, to, f) = if ratio < 0.5 {
        (COOL, MID, ratio * 2.0)
    } else {
        (MID, WARM, (ratio - 0.5) * 2.0)
    };
    let channel = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2)
    )
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// A zero or degenerate span would divide to NaN; plot it as a unit span.
fn span_or_unit(span: f64) -> f64 {
    if span.is_finite() && span > 0.0 {
        span
    } else {
        1.0
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
