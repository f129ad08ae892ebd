//! The registry of benchmarkable operations
//!
//! Each [`Operation`] knows its identifier, a description and the rule used to
//! prepare its operands. Dispatch is an exhaustive `match`, so adding an
//! operation forces every consumer to handle it.

use crate::error::{BenchError, MatrixError};
use crate::matrix::SparseMatrix;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sprs::CsVec;
use std::fmt;
use std::str::FromStr;

/// One benchmarkable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Splice one row out of the matrix
    #[serde(rename = "spr")]
    SpliceRow,
    /// Splice one column out of the matrix
    #[serde(rename = "spc")]
    SpliceColumn,
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "sub")]
    Subtract,
    #[serde(rename = "sm")]
    ScalarMultiply,
    /// Multiply the matrix with a dense vector taken from one of its rows
    #[serde(rename = "mvm")]
    MatrixVector,
    #[serde(rename = "mmm")]
    MatrixMatrix,
    #[serde(rename = "tps")]
    Transpose,
}

/// Which dimension an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// How the operands of an operation are prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRule {
    /// The primary matrix alone
    Unary,
    /// The primary matrix and an index along `Axis`
    Indexed(Axis),
    /// The primary and the secondary matrix
    Binary,
    /// A scalar and the primary matrix
    Scalar,
    /// The primary matrix and a dense vector spliced from one of its rows
    MatrixVector,
}

impl Operation {
    /// Every operation in declaration order, which is also the order of `full`
    pub const ALL: [Operation; 8] = [
        Operation::SpliceRow,
        Operation::SpliceColumn,
        Operation::Add,
        Operation::Subtract,
        Operation::ScalarMultiply,
        Operation::MatrixVector,
        Operation::MatrixMatrix,
        Operation::Transpose,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Operation::SpliceRow => "spr",
            Operation::SpliceColumn => "spc",
            Operation::Add => "add",
            Operation::Subtract => "sub",
            Operation::ScalarMultiply => "sm",
            Operation::MatrixVector => "mvm",
            Operation::MatrixMatrix => "mmm",
            Operation::Transpose => "tps",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::SpliceRow => "Splice a row out of matrix A (uses --index or a random row)",
            Operation::SpliceColumn => {
                "Splice a column out of matrix A (uses --index or a random column)"
            }
            Operation::Add => "Add matrices A and B (requires --path-b)",
            Operation::Subtract => "Subtract matrix B from matrix A (requires --path-b)",
            Operation::ScalarMultiply => "Multiply matrix A by a scalar (requires --scalar)",
            Operation::MatrixVector => {
                "Multiply matrix A by one of its rows as a dense vector (uses --index or a random row)"
            }
            Operation::MatrixMatrix => "Multiply matrix A by matrix B (requires --path-b)",
            Operation::Transpose => "Transpose matrix A",
        }
    }

    pub fn operand_rule(self) -> OperandRule {
        match self {
            Operation::SpliceRow => OperandRule::Indexed(Axis::Row),
            Operation::SpliceColumn => OperandRule::Indexed(Axis::Column),
            Operation::Add | Operation::Subtract | Operation::MatrixMatrix => OperandRule::Binary,
            Operation::ScalarMultiply => OperandRule::Scalar,
            Operation::MatrixVector => OperandRule::MatrixVector,
            Operation::Transpose => OperandRule::Unary,
        }
    }

    /// The row or column an operation needs an index for, if any
    pub fn index_axis(self) -> Option<Axis> {
        match self.operand_rule() {
            OperandRule::Indexed(axis) => Some(axis),
            OperandRule::MatrixVector => Some(Axis::Row),
            _ => None,
        }
    }

    /// Runs the operation on prepared operands
    ///
    /// Operands of the wrong shape for this operation are reported as
    /// [`MatrixError::OperandMismatch`].
    pub fn apply(self, operands: &Operands<'_>) -> Result<OpOutput, MatrixError> {
        match (self, operands) {
            (Operation::SpliceRow, Operands::Indexed(a, i)) => {
                a.row(*i).map(OpOutput::SparseVector)
            }
            (Operation::SpliceColumn, Operands::Indexed(a, j)) => {
                a.col(*j).map(OpOutput::SparseVector)
            }
            (Operation::Add, Operands::Binary(a, b)) => a.add(b).map(OpOutput::Matrix),
            (Operation::Subtract, Operands::Binary(a, b)) => a.sub(b).map(OpOutput::Matrix),
            (Operation::MatrixMatrix, Operands::Binary(a, b)) => {
                a.mul_mat(b).map(OpOutput::Matrix)
            }
            (Operation::ScalarMultiply, Operands::Scalar(s, a)) => {
                Ok(OpOutput::Matrix(a.scale(*s)))
            }
            (Operation::MatrixVector, Operands::MatrixVector(a, x)) => {
                a.mul_vec(x).map(OpOutput::DenseVector)
            }
            (Operation::Transpose, Operands::Unary(a)) => Ok(OpOutput::Matrix(a.transpose())),
            (operation, _) => Err(MatrixError::OperandMismatch {
                operation: operation.id(),
                expected: operation.operand_rule().name(),
            }),
        }
    }
}

impl OperandRule {
    pub fn name(self) -> &'static str {
        match self {
            OperandRule::Unary => "unary",
            OperandRule::Indexed(Axis::Row) => "matrix and row index",
            OperandRule::Indexed(Axis::Column) => "matrix and column index",
            OperandRule::Binary => "two matrix",
            OperandRule::Scalar => "scalar and matrix",
            OperandRule::MatrixVector => "matrix and vector",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Operation {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.id() == id)
            .ok_or_else(|| BenchError::InvalidInputFormat(format!("unknown mode '{}'", s)))
    }
}

/// What the caller asked to benchmark: one operation or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single(Operation),
    Full,
}

impl Mode {
    pub const FULL_ID: &'static str = "full";

    /// The operations this mode expands to, in registry order
    pub fn operations(self) -> Vec<Operation> {
        match self {
            Mode::Single(op) => vec![op],
            Mode::Full => Operation::ALL.to_vec(),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Mode::Single(op) => op.id(),
            Mode::Full => Mode::FULL_ID,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Single(op) => op.description(),
            Mode::Full => "Run every operation in turn (requires --path-b and --scalar)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Mode::FULL_ID) {
            Ok(Mode::Full)
        } else {
            s.parse().map(Mode::Single)
        }
    }
}

/// Prepared operands, borrowed from the loaded matrices
#[derive(Debug)]
pub enum Operands<'a> {
    Unary(&'a SparseMatrix),
    Indexed(&'a SparseMatrix, usize),
    Binary(&'a SparseMatrix, &'a SparseMatrix),
    Scalar(f64, &'a SparseMatrix),
    MatrixVector(&'a SparseMatrix, Array1<f64>),
}

/// The value an operation produces
#[derive(Debug, Clone)]
pub enum OpOutput {
    Matrix(SparseMatrix),
    SparseVector(CsVec<f64>),
    DenseVector(Array1<f64>),
}

impl OpOutput {
    /// One-line description used by the one-shot run
    pub fn summary(&self) -> String {
        match self {
            OpOutput::Matrix(m) => format!(
                "{} matrix, {} x {}, {} stored entries",
                m.format(),
                m.rows(),
                m.cols(),
                m.nnz()
            ),
            OpOutput::SparseVector(v) => {
                format!("sparse vector of length {}, {} stored entries", v.dim(), v.nnz())
            }
            OpOutput::DenseVector(v) => format!("dense vector of length {}", v.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::StorageFormat;
    use sprs::TriMat;

    fn sample(format: StorageFormat) -> SparseMatrix {
        let tri = TriMat::from_triplets(
            (2, 3),
            vec![0, 1, 1],
            vec![2, 0, 1],
            vec![1.0, 2.0, 3.0],
        );
        SparseMatrix::from_triplets(&tri, format, 1)
    }

    #[test]
    fn test_ids_parse_back() {
        for op in Operation::ALL {
            assert_eq!(op.id().parse::<Operation>().unwrap(), op);
            assert_eq!(op.id().parse::<Mode>().unwrap(), Mode::Single(op));
        }
        assert_eq!("full".parse::<Mode>().unwrap(), Mode::Full);
        assert!("inv".parse::<Mode>().is_err());
    }

    #[test]
    fn test_full_expands_in_declaration_order() {
        let ids: Vec<_> = Mode::Full.operations().iter().map(|op| op.id()).collect();
        assert_eq!(ids, vec!["spr", "spc", "add", "sub", "sm", "mvm", "mmm", "tps"]);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&Operation::MatrixVector).unwrap();
        assert_eq!(json, "\"mvm\"");
        let op: Operation = serde_json::from_str("\"tps\"").unwrap();
        assert_eq!(op, Operation::Transpose);
    }

    #[test]
    fn test_apply() {
        let a = sample(StorageFormat::Csr);

        match Operation::SpliceColumn.apply(&Operands::Indexed(&a, 1)).unwrap() {
            OpOutput::SparseVector(v) => assert_eq!(v.data(), &[3.0]),
            other => panic!("unexpected output {}", other.summary()),
        }

        let x = Array1::from(vec![1.0, 1.0, 1.0]);
        match Operation::MatrixVector
            .apply(&Operands::MatrixVector(&a, x))
            .unwrap()
        {
            OpOutput::DenseVector(y) => assert_eq!(y.to_vec(), vec![1.0, 5.0]),
            other => panic!("unexpected output {}", other.summary()),
        }

        match Operation::Transpose.apply(&Operands::Unary(&a)).unwrap() {
            OpOutput::Matrix(t) => assert_eq!(t.shape(), (3, 2)),
            other => panic!("unexpected output {}", other.summary()),
        }
    }

    #[test]
    fn test_apply_with_wrong_operands() {
        let a = sample(StorageFormat::Coo);
        let err = Operation::Add.apply(&Operands::Unary(&a)).unwrap_err();
        assert_eq!(
            err,
            MatrixError::OperandMismatch {
                operation: "add",
                expected: "two matrix"
            }
        );
    }

    #[test]
    fn test_apply_propagates_kernel_errors() {
        let a = sample(StorageFormat::Dia);
        let err = Operation::MatrixMatrix
            .apply(&Operands::Binary(&a, &a))
            .unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { .. }));
    }
}
