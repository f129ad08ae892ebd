//! Summary statistics of a run, as CSV and as a text table
//!
//! Timings are stored in seconds and reported in milliseconds. Quantiles use
//! linear interpolation between closest ranks (Hyndman and Fan type 7, the
//! default of NumPy and R); the variance uses the `n - 1` denominator.

use crate::constants::MS_PER_SECOND;
use crate::error::Result;
use crate::matrix::StorageFormat;
use crate::registry::Operation;
use crate::results::RunResult;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Descriptive statistics of one sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub std_dev: f64,
    pub mean: f64,
    pub variance: f64,
    pub range: f64,
}

/// Quantile `q` of an ascending slice, interpolating linearly between ranks
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty(), "quantile of an empty sample");
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

impl Summary {
    /// Summarizes `samples`; `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = if sorted.len() > 1 {
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Some(Self {
            min,
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max,
            std_dev: variance.sqrt(),
            mean,
            variance,
            range: max - min,
        })
    }
}

/// One line of the statistics table, values in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    #[serde(rename = "Format")]
    pub format: StorageFormat,
    #[serde(rename = "Benchmark")]
    pub benchmark: Operation,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "P25")]
    pub p25: f64,
    #[serde(rename = "P50(Median)")]
    pub median: f64,
    #[serde(rename = "P75")]
    pub p75: f64,
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "StdDev")]
    pub std_dev: f64,
    #[serde(rename = "Mean")]
    pub mean: f64,
    #[serde(rename = "Variance")]
    pub variance: f64,
    #[serde(rename = "Range")]
    pub range: f64,
}

impl StatsRow {
    pub fn new(format: StorageFormat, benchmark: Operation, summary: Summary) -> Self {
        Self {
            format,
            benchmark,
            min: summary.min,
            p25: summary.p25,
            median: summary.median,
            p75: summary.p75,
            max: summary.max,
            std_dev: summary.std_dev,
            mean: summary.mean,
            variance: summary.variance,
            range: summary.range,
        }
    }

    /// The statistics in table column order
    pub fn values(&self) -> [f64; 9] {
        [
            self.min,
            self.p25,
            self.median,
            self.p75,
            self.max,
            self.std_dev,
            self.mean,
            self.variance,
            self.range,
        ]
    }
}

/// One row per (format, operation) with at least one sample, in document order
pub fn summarize(run: &RunResult) -> Vec<StatsRow> {
    run.data
        .iter()
        .flat_map(|format_result| {
            format_result.results.iter().filter_map(move |result| {
                let millis: Vec<f64> = result.time.iter().map(|t| t * MS_PER_SECOND).collect();
                Summary::from_samples(&millis)
                    .map(|summary| StatsRow::new(format_result.format, result.mode, summary))
            })
        })
        .collect()
}

/// Writes the rows as CSV, header first
pub fn write_csv<W: Write>(rows: &[StatsRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(rows: &[StatsRow], path: &Path) -> Result<()> {
    let mut csv_writer = csv::Writer::from_path(path)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Fixed-width text table of the rows
pub fn render_table(rows: &[StatsRow]) -> String {
    const HEADERS: [&str; 11] = [
        "Format",
        "Benchmark",
        "Min",
        "P25",
        "P50(Median)",
        "P75",
        "Max",
        "StdDev",
        "Mean",
        "Variance",
        "Range",
    ];

    let mut table = String::new();
    let _ = write!(table, "{:<8}{:<11}", HEADERS[0], HEADERS[1]);
    for header in &HEADERS[2..] {
        let _ = write!(table, "{:>13}", header);
    }
    table.push('\n');

    for row in rows {
        let _ = write!(table, "{:<8}{:<11}", row.format.id(), row.benchmark.id());
        for value in row.values() {
            let _ = write!(table, "{:>13.6}", value);
        }
        table.push('\n');
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{BenchmarkResult, FormatResult};

    #[test]
    fn test_quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.75), 3.25);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn test_summary() {
        let s = Summary::from_samples(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.p25, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.p75, 4.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.variance, 2.5);
        assert_eq!(s.range, 4.0);
        assert!((s.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample() {
        let s = Summary::from_samples(&[0.7]).unwrap();
        assert_eq!((s.min, s.median, s.max), (0.7, 0.7, 0.7));
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.range, 0.0);
        assert!(Summary::from_samples(&[]).is_none());
    }

    #[test]
    fn test_csv_header_and_units() {
        let run = RunResult {
            data: vec![FormatResult {
                format: StorageFormat::Csc,
                results: vec![BenchmarkResult {
                    mode: Operation::Add,
                    time: vec![0.002, 0.004],
                }],
            }],
        };
        let rows = summarize(&run);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].max, 4.0);

        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Format,Benchmark,Min,P25,P50(Median),P75,Max,StdDev,Mean,Variance,Range")
        );
        assert!(lines.next().unwrap().starts_with("csc,add,2.0,2.5,3.0,3.5,4.0,"));

        let table = render_table(&rows);
        assert!(table.starts_with("Format  Benchmark"));
        assert!(table.contains("csc     add"));
    }
}
