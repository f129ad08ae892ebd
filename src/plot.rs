//! SVG rendering of benchmark results and sparsity patterns
//!
//! Both renderers are pure: they read their inputs and return the SVG text.

use crate::constants::{
    MS_PER_SECOND, PLOT_LABEL_WIDTH, PLOT_PANEL_FOOTER, PLOT_PANEL_HEADER, PLOT_RIGHT_MARGIN,
    PLOT_ROW_HEIGHT, PLOT_WIDTH, SPY_COLUMNS, SPY_MARKER_SIZE, SPY_PANEL_GAP, SPY_PANEL_SIZE,
};
use crate::registry::Operation;
use crate::results::RunResult;
use crate::stats::quantile;
use crate::utils::xml_escape;
use sprs::TriMat;
use std::fmt::{self, Write};

/// Box fill per result document, cycled when there are more documents
const SERIES_COLORS: [&str; 4] = ["#4C72B0", "#DD8452", "#55A868", "#C44E52"];

/// Smallest time drawn on a log axis; non-positive samples are raised to it
const MIN_PLOT_MS: f64 = 1e-6;

/// A result document with an optional backend label
#[derive(Debug, Clone, Copy)]
pub struct LabeledRun<'a> {
    pub label: Option<&'a str>,
    pub run: &'a RunResult,
}

/// Five-number summary of one box, in milliseconds
#[derive(Debug, Clone, PartialEq)]
struct BoxStats {
    q1: f64,
    median: f64,
    q3: f64,
    whisker_low: f64,
    whisker_high: f64,
    outliers: Vec<f64>,
}

impl BoxStats {
    /// Whiskers reach the furthest sample within 1.5 IQR of the box
    fn from_millis(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = samples.iter().map(|&v| v.max(MIN_PLOT_MS)).collect();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let (inside, outliers): (Vec<f64>, Vec<f64>) = sorted
            .iter()
            .partition(|&&v| v >= low_fence && v <= high_fence);

        Some(Self {
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            whisker_low: inside.first().copied().unwrap_or(q1),
            whisker_high: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

/// One labelled box of a panel
struct Series {
    label: String,
    color: &'static str,
    stats: BoxStats,
}

/// Decades covered by a log axis
struct LogAxis {
    low: i32,
    high: i32,
    x0: f64,
    width: f64,
}

impl LogAxis {
    fn covering(series: &[Series], x0: f64, width: f64) -> Self {
        let min = series
            .iter()
            .map(|s| s.stats.whisker_low.min(s.stats.q1))
            .chain(series.iter().flat_map(|s| s.stats.outliers.iter().copied()))
            .fold(f64::INFINITY, f64::min);
        let max = series
            .iter()
            .map(|s| s.stats.whisker_high.max(s.stats.q3))
            .chain(series.iter().flat_map(|s| s.stats.outliers.iter().copied()))
            .fold(f64::NEG_INFINITY, f64::max);

        let low = min.log10().floor() as i32;
        let mut high = max.log10().ceil() as i32;
        if high <= low {
            high = low + 1;
        }
        Self {
            low,
            high,
            x0,
            width,
        }
    }

    fn x(&self, value_ms: f64) -> f64 {
        let t = (value_ms.max(MIN_PLOT_MS).log10() - self.low as f64)
            / (self.high - self.low) as f64;
        self.x0 + t * self.width
    }
}

/// Collects the boxes of one operation across all documents
fn panel_series(runs: &[LabeledRun<'_>], operation: Operation) -> Vec<Series> {
    let mut series = Vec::new();
    for (k, labeled) in runs.iter().enumerate() {
        for format_result in &labeled.run.data {
            let Some(result) = format_result.results.iter().find(|r| r.mode == operation) else {
                continue;
            };
            let millis: Vec<f64> = result.time.iter().map(|t| t * MS_PER_SECOND).collect();
            if let Some(stats) = BoxStats::from_millis(&millis) {
                let label = match labeled.label {
                    Some(backend) => format!("{} ({})", format_result.format, backend),
                    None => format_result.format.to_string(),
                };
                series.push(Series {
                    label,
                    color: SERIES_COLORS[k % SERIES_COLORS.len()],
                    stats,
                });
            }
        }
    }
    series
}

fn write_panel(
    svg: &mut String,
    operation: Operation,
    series: &[Series],
    top: f64,
) -> Result<f64, fmt::Error> {
    let plot_width = PLOT_WIDTH - PLOT_LABEL_WIDTH - PLOT_RIGHT_MARGIN;
    let axis = LogAxis::covering(series, PLOT_LABEL_WIDTH, plot_width);
    let body_top = top + PLOT_PANEL_HEADER;
    let body_height = series.len() as f64 * PLOT_ROW_HEIGHT;
    let axis_y = body_top + body_height;

    writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{:.1}\" class=\"title\">{} ({})</text>",
        PLOT_LABEL_WIDTH,
        top + 24.0,
        xml_escape(operation.description()),
        operation.id()
    )?;

    // Decade grid with labels under the axis
    for decade in axis.low..=axis.high {
        let x = axis.x(10f64.powi(decade));
        writeln!(
            svg,
            "  <line x1=\"{x:.1}\" y1=\"{body_top:.1}\" x2=\"{x:.1}\" y2=\"{axis_y:.1}\" class=\"grid\"/>"
        )?;
        writeln!(
            svg,
            "  <text x=\"{x:.1}\" y=\"{:.1}\" class=\"tick\" text-anchor=\"middle\">1e{decade}</text>",
            axis_y + 16.0
        )?;
    }
    writeln!(
        svg,
        "  <line x1=\"{:.1}\" y1=\"{axis_y:.1}\" x2=\"{:.1}\" y2=\"{axis_y:.1}\" class=\"axis\"/>",
        axis.x0,
        axis.x0 + axis.width
    )?;
    writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{:.1}\" class=\"tick\" text-anchor=\"middle\">time [ms]</text>",
        axis.x0 + axis.width / 2.0,
        axis_y + 32.0
    )?;

    for (row, s) in series.iter().enumerate() {
        let y_mid = body_top + (row as f64 + 0.5) * PLOT_ROW_HEIGHT;
        let half = PLOT_ROW_HEIGHT * 0.35;
        let b = &s.stats;

        writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" class=\"label\" text-anchor=\"end\">{}</text>",
            PLOT_LABEL_WIDTH - 8.0,
            y_mid + 4.0,
            xml_escape(&s.label)
        )?;
        writeln!(
            svg,
            "  <line x1=\"{:.1}\" y1=\"{y_mid:.1}\" x2=\"{:.1}\" y2=\"{y_mid:.1}\" class=\"whisker\"/>",
            axis.x(b.whisker_low),
            axis.x(b.whisker_high)
        )?;
        let (x_q1, x_q3) = (axis.x(b.q1), axis.x(b.q3));
        writeln!(
            svg,
            "  <rect x=\"{x_q1:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" class=\"box\"/>",
            y_mid - half,
            (x_q3 - x_q1).max(1.0),
            2.0 * half,
            s.color
        )?;
        let x_med = axis.x(b.median);
        writeln!(
            svg,
            "  <line x1=\"{x_med:.1}\" y1=\"{:.1}\" x2=\"{x_med:.1}\" y2=\"{:.1}\" class=\"median\"/>",
            y_mid - half,
            y_mid + half
        )?;
        for &outlier in &b.outliers {
            writeln!(
                svg,
                "  <circle cx=\"{:.1}\" cy=\"{y_mid:.1}\" r=\"2.5\" class=\"outlier\"/>",
                axis.x(outlier)
            )?;
        }
    }

    Ok(PLOT_PANEL_HEADER + body_height + PLOT_PANEL_FOOTER)
}

fn write_box_plots(svg: &mut String, runs: &[LabeledRun<'_>]) -> fmt::Result {
    let panels: Vec<(Operation, Vec<Series>)> = Operation::ALL
        .into_iter()
        .map(|op| (op, panel_series(runs, op)))
        .filter(|(_, series)| !series.is_empty())
        .collect();

    let height: f64 = panels
        .iter()
        .map(|(_, s)| PLOT_PANEL_HEADER + s.len() as f64 * PLOT_ROW_HEIGHT + PLOT_PANEL_FOOTER)
        .sum::<f64>()
        .max(PLOT_PANEL_HEADER);

    writeln!(svg, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{PLOT_WIDTH:.0}\" height=\"{height:.0}\">"
    )?;
    svg.push_str("  <style>\n");
    svg.push_str("    text { font-family: sans-serif; }\n");
    svg.push_str("    .title { font-size: 14px; font-weight: bold; }\n");
    svg.push_str("    .label, .tick { font-size: 11px; }\n");
    svg.push_str("    .grid { stroke: #ddd; }\n");
    svg.push_str("    .axis, .whisker { stroke: #333; }\n");
    svg.push_str("    .box { stroke: #333; fill-opacity: 0.8; }\n");
    svg.push_str("    .median { stroke: #000; stroke-width: 2; }\n");
    svg.push_str("    .outlier { fill: none; stroke: #333; }\n");
    svg.push_str("  </style>\n");
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    let mut top = 0.0;
    for (operation, series) in &panels {
        top += write_panel(svg, *operation, series, top)?;
    }

    svg.push_str("</svg>\n");
    Ok(())
}

/// Renders one box-plot panel per operation, one box per format and document
///
/// Panels follow registry order and the x axis is log-scaled milliseconds.
/// When several documents are given, each box label carries the document label.
pub fn render_box_plots(runs: &[LabeledRun<'_>]) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = write_box_plots(&mut svg, runs);
    svg
}

/// Title of the `index`-th sparsity panel: `a) stem`, `b) stem`, ...
pub fn panel_title(index: usize, stem: &str) -> String {
    let letter = char::from(b'a' + (index % 26) as u8);
    format!("{letter}) {stem}")
}

fn write_sparsity_patterns(svg: &mut String, matrices: &[(String, &TriMat<f64>)]) -> fmt::Result {
    let rows = matrices.len().div_ceil(SPY_COLUMNS).max(1);
    let cell = SPY_PANEL_SIZE + SPY_PANEL_GAP;
    let width = SPY_COLUMNS as f64 * cell + SPY_PANEL_GAP;
    let height = rows as f64 * cell + SPY_PANEL_GAP;

    writeln!(svg, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\">"
    )?;
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    for (index, (stem, matrix)) in matrices.iter().enumerate() {
        let x0 = SPY_PANEL_GAP + (index % SPY_COLUMNS) as f64 * cell;
        let y0 = SPY_PANEL_GAP + (index / SPY_COLUMNS) as f64 * cell;

        writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"14\" text-anchor=\"middle\">{}</text>",
            x0 + SPY_PANEL_SIZE / 2.0,
            y0 - 10.0,
            xml_escape(&panel_title(index, stem))
        )?;
        writeln!(
            svg,
            "  <rect x=\"{x0:.1}\" y=\"{y0:.1}\" width=\"{SPY_PANEL_SIZE:.1}\" height=\"{SPY_PANEL_SIZE:.1}\" fill=\"none\" stroke=\"#333\"/>"
        )?;

        let n_rows = matrix.rows().max(1) as f64;
        let n_cols = matrix.cols().max(1) as f64;
        let marker_w = (SPY_PANEL_SIZE / n_cols).max(SPY_MARKER_SIZE);
        let marker_h = (SPY_PANEL_SIZE / n_rows).max(SPY_MARKER_SIZE);

        writeln!(svg, "  <g fill=\"#000000\">")?;
        for (&i, &j) in matrix.row_inds().iter().zip(matrix.col_inds()) {
            writeln!(
                svg,
                "    <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{marker_w:.2}\" height=\"{marker_h:.2}\"/>",
                x0 + j as f64 / n_cols * SPY_PANEL_SIZE,
                y0 + i as f64 / n_rows * SPY_PANEL_SIZE
            )?;
        }
        writeln!(svg, "  </g>")?;
    }

    svg.push_str("</svg>\n");
    Ok(())
}

/// Renders the non-zero pattern of each matrix in a two-column grid
///
/// Panels are drawn in the order given and titled with [`panel_title`].
pub fn render_sparsity_patterns(matrices: &[(String, &TriMat<f64>)]) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = write_sparsity_patterns(&mut svg, matrices);
    svg
}
