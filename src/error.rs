//! Error types for the benchmarking harness.
//!
//! Two layers are used. [`MatrixError`] is raised by the storage formats
//! themselves when an operation cannot be carried out on its operands.
//! [`BenchError`] is what the harness surfaces to callers: it wraps matrix
//! errors together with the format and operation that triggered them, and
//! adds the loading, operand and reporting failures.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by sparse matrix kernels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The operands do not have compatible shapes for the operation.
    #[error("dimension mismatch: left operand is {left:?}, right operand is {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A row or column index lies outside the matrix.
    #[error("index {index} out of range for dimension of size {bound}")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Binary operations require both operands in the same storage format.
    #[error("storage format mismatch: cannot combine '{left}' with '{right}'")]
    FormatMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// A dense vector does not match the matrix dimension it multiplies.
    #[error("vector length {len} does not match matrix column count {cols}")]
    VectorLength { len: usize, cols: usize },

    /// The operands handed to an operation are not of the shape it expects.
    #[error("operation '{operation}' expects {expected} operands")]
    OperandMismatch {
        operation: &'static str,
        expected: &'static str,
    },
}

/// Represents all possible errors of a benchmark run.
#[derive(Error, Debug)]
pub enum BenchError {
    /// The input is not a MatrixMarket coordinate file, could not be parsed,
    /// or names an unknown storage format or operation.
    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),

    /// An operand required by the selected operation was not supplied.
    #[error("missing operand: option '{operand}' required for mode '{operation}'")]
    MissingOperand {
        operand: &'static str,
        operation: &'static str,
    },

    /// The repetition count must be at least one.
    #[error("invalid repetition count {0}: at least one repetition is required")]
    InvalidRepetitionCount(usize),

    /// An explicit row or column index lies outside the primary matrix.
    #[error("index {index} out of range for mode '{operation}' (valid range 0..{bound})")]
    IndexOutOfRange {
        index: usize,
        bound: usize,
        operation: &'static str,
    },

    /// The primary matrix has no row or column to slice.
    #[error("mode '{operation}' needs a {axis} index but the matrix has no {axis}s")]
    EmptyDimension {
        axis: &'static str,
        operation: &'static str,
    },

    /// The numerical kernel failed while executing an operation.
    #[error("operation '{operation}' failed for format '{format}': {source}")]
    OperationExecutionFailure {
        format: &'static str,
        operation: &'static str,
        #[source]
        source: MatrixError,
    },

    /// Result matrices can only be exported to `.mtx` files.
    #[error("output path {0:?} is not a .mtx file")]
    InvalidOutputPath(PathBuf),

    /// The harness configuration file could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BenchError {
    /// Attaches format and operation context to a kernel failure.
    pub fn execution(format: &'static str, operation: &'static str, source: MatrixError) -> Self {
        BenchError::OperationExecutionFailure {
            format,
            operation,
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;
