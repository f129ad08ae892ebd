//! The run result document
//!
//! A run produces `{"data": [{"format": .., "results": [{"mode": .., "time": [..]}]}]}`.
//! Timings are stored in seconds, in the order they were measured.

use crate::error::Result;
use crate::matrix::StorageFormat;
use crate::registry::Operation;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Timings of one operation on one format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub mode: Operation,
    /// Seconds per repetition, in call order
    pub time: Vec<f64>,
}

/// All operations benchmarked on one format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatResult {
    pub format: StorageFormat,
    pub results: Vec<BenchmarkResult>,
}

/// Root document of a benchmark run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub data: Vec<FormatResult>,
}

impl RunResult {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Operations present anywhere in the document, in registry order
    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| {
                self.data
                    .iter()
                    .any(|f| f.results.iter().any(|r| r.mode == *op))
            })
            .collect()
    }

    /// Timings of `operation` on `format`, if that pair was benchmarked
    pub fn samples(&self, format: StorageFormat, operation: Operation) -> Option<&[f64]> {
        self.data
            .iter()
            .find(|f| f.format == format)?
            .results
            .iter()
            .find(|r| r.mode == operation)
            .map(|r| r.time.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunResult {
        RunResult {
            data: vec![FormatResult {
                format: StorageFormat::Csr,
                results: vec![
                    BenchmarkResult {
                        mode: Operation::Transpose,
                        time: vec![0.001, 0.002],
                    },
                    BenchmarkResult {
                        mode: Operation::SpliceRow,
                        time: vec![0.5],
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_document_shape() {
        let value: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["data"][0]["format"], "csr");
        assert_eq!(value["data"][0]["results"][0]["mode"], "tps");
        assert_eq!(value["data"][0]["results"][0]["time"][1], 0.002);
    }

    #[test]
    fn test_reads_existing_documents() {
        let json = r#"{"data": [{"format": "dok", "results": [{"mode": "mvm", "time": [1.5e-05, 2e-05]}]}]}"#;
        let run = RunResult::from_json(json).unwrap();
        assert_eq!(
            run.samples(StorageFormat::Dok, Operation::MatrixVector),
            Some(&[1.5e-05, 2e-05][..])
        );
        assert_eq!(run.samples(StorageFormat::Csr, Operation::MatrixVector), None);
    }

    #[test]
    fn test_operations_in_registry_order() {
        assert_eq!(
            sample().operations(),
            vec![Operation::SpliceRow, Operation::Transpose]
        );
    }
}
