//! Memory footprint of one matrix in every storage format

use crate::matrix::{SparseMatrix, StorageFormat};
use crate::utils::perf::peak_rss_kb;
use serde::Serialize;
use sprs::TriMat;
use std::fmt;

/// Heap bytes used by one storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatFootprint {
    pub format: StorageFormat,
    pub bytes: usize,
}

/// Sizes of one input matrix across formats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryReport {
    /// Stored entries of the input as loaded
    pub nnz: usize,
    pub element_type: &'static str,
    /// Bytes per stored value
    pub element_size: usize,
    pub formats: Vec<FormatFootprint>,
    /// Process peak RSS after all formats were built, 0 when unavailable
    pub peak_rss_kb: u64,
}

impl MemoryReport {
    /// Builds `triplets` in every format of `formats` and records its heap size
    pub fn measure(triplets: &TriMat<f64>, formats: &[StorageFormat], bsr_block: usize) -> Self {
        let formats = formats
            .iter()
            .map(|&format| {
                let matrix = SparseMatrix::from_triplets(triplets, format, bsr_block);
                FormatFootprint {
                    format,
                    bytes: matrix.heap_bytes(),
                }
            })
            .collect();

        Self {
            nnz: triplets.nnz(),
            element_type: "f64",
            element_size: std::mem::size_of::<f64>(),
            formats,
            peak_rss_kb: peak_rss_kb(),
        }
    }

    /// Bytes needed by the values alone
    pub fn payload_bytes(&self) -> usize {
        self.nnz * self.element_size
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Number of non-zero entries in matrix is {}. The type is {} with size {} bytes.",
            self.nnz, self.element_type, self.element_size
        )?;
        writeln!(f, "The non-zero entries require {} bytes.", self.payload_bytes())?;
        for footprint in &self.formats {
            writeln!(
                f,
                "{} - {} bytes",
                footprint.format.id().to_uppercase(),
                footprint.bytes
            )?;
        }
        write!(f, "Peak RSS: {} KB", self.peak_rss_kb)
    }
}
