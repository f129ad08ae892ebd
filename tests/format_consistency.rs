//! Integration tests checking every storage format against the CSR reference

use ndarray::{Array1, Array2};
use sparsebench::matrix::{BsrMatrix, DiaMatrix, DokMatrix, LilMatrix, MatrixGenerator};
use sparsebench::registry::{OpOutput, Operands};
use sparsebench::{Operation, SparseMatrix, StorageFormat};
use sprs::{CsMat, TriMat};

const TOLERANCE: f64 = 1e-10;

/// Creates a 6x6 test matrix:
/// [ 1.0  0.0  2.0  0.0  0.0  0.0 ]
/// [ 0.0  3.0  0.0  0.0  4.0  0.0 ]
/// [ 0.0  0.0  5.0  0.0  0.0  0.0 ]
/// [ 6.0  0.0  0.0  7.0  0.0  0.0 ]
/// [ 0.0  0.0  8.0  0.0  9.0  0.0 ]
/// [ 0.0  0.0  0.0  0.0  0.0 10.0 ]
fn create_test_triplets() -> TriMat<f64> {
    TriMat::from_triplets(
        (6, 6),
        vec![0, 0, 1, 1, 2, 3, 3, 4, 4, 5],
        vec![0, 2, 1, 4, 2, 0, 3, 2, 4, 5],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
    )
}

fn output_to_dense(output: OpOutput) -> Result<Array2<f64>, Array1<f64>> {
    match output {
        OpOutput::Matrix(m) => Ok(m.to_dense()),
        OpOutput::SparseVector(v) => Err(v.to_dense()),
        OpOutput::DenseVector(v) => Err(v),
    }
}

fn assert_close_matrix(actual: &Array2<f64>, expected: &Array2<f64>, context: &str) {
    assert_eq!(actual.shape(), expected.shape(), "{context}: shape");
    for ((idx, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!((a - e).abs() < TOLERANCE, "{context}: entry {idx:?} is {a}, expected {e}");
    }
}

fn assert_close_vector(actual: &Array1<f64>, expected: &Array1<f64>, context: &str) {
    assert_eq!(actual.len(), expected.len(), "{context}: length");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() < TOLERANCE, "{context}: entry {i} is {a}, expected {e}");
    }
}

/// Runs `operation` on `format` and on CSR and compares the results
fn check_against_reference(a: &TriMat<f64>, b: &TriMat<f64>, format: StorageFormat, operation: Operation) {
    let run = |format: StorageFormat| {
        let x = SparseMatrix::from_triplets(a, format, 2);
        let y = SparseMatrix::from_triplets(b, format, 2);
        let vector = x.row(1).unwrap().to_dense();
        let operands = match operation {
            Operation::SpliceRow => Operands::Indexed(&x, 3),
            Operation::SpliceColumn => Operands::Indexed(&x, 2),
            Operation::Add | Operation::Subtract | Operation::MatrixMatrix => Operands::Binary(&x, &y),
            Operation::ScalarMultiply => Operands::Scalar(-2.5, &x),
            Operation::MatrixVector => Operands::MatrixVector(&x, vector),
            Operation::Transpose => Operands::Unary(&x),
        };
        output_to_dense(operation.apply(&operands).unwrap())
    };

    let context = format!("{operation} on {format}");
    match (run(format), run(StorageFormat::Csr)) {
        (Ok(actual), Ok(expected)) => assert_close_matrix(&actual, &expected, &context),
        (Err(actual), Err(expected)) => assert_close_vector(&actual, &expected, &context),
        _ => panic!("{context}: result kind differs from CSR"),
    }
}

#[test]
fn test_every_format_matches_csr_on_every_operation() {
    let a = create_test_triplets();
    let b = MatrixGenerator::new(11).generate_random(6, 6, 0.4);

    for format in StorageFormat::ALL {
        for operation in Operation::ALL {
            check_against_reference(&a, &b, format, operation);
        }
    }
}

#[test]
fn test_random_inputs_match_csr() {
    let mut generator = MatrixGenerator::new(2024);
    let a = generator.generate_random(12, 12, 0.2);
    let b = generator.generate_banded(12, 2);

    for format in StorageFormat::ALL {
        for operation in Operation::ALL {
            check_against_reference(&a, &b, format, operation);
        }
    }
}

#[test]
fn test_shape_and_nnz_agree_across_formats() {
    let tri = create_test_triplets();
    for format in StorageFormat::ALL {
        let m = SparseMatrix::from_triplets(&tri, format, 2);
        assert_eq!(m.format(), format);
        assert_eq!(m.shape(), (6, 6));
        assert_eq!(m.element_size(), 8);
        let reference: CsMat<f64> = tri.to_csr();
        assert_close_matrix(&m.to_dense(), &reference.to_dense(), format.id());
        if !matches!(format, StorageFormat::Dia | StorageFormat::Bsr) {
            assert_eq!(m.nnz(), 10, "{format}");
        }
    }
}

#[test]
fn test_coo_sums_duplicates_on_use() {
    let tri = TriMat::from_triplets((2, 2), vec![0, 0, 1], vec![1, 1, 0], vec![1.0, 2.0, 4.0]);
    let coo = SparseMatrix::from_triplets(&tri, StorageFormat::Coo, 2);
    let dense = coo.to_dense();
    assert_eq!(dense[[0, 1]], 3.0);
    assert_eq!(coo.row(0).unwrap().get(1), Some(&3.0));
}

#[test]
fn test_dia_round_trip() {
    let csr: CsMat<f64> = create_test_triplets().to_csr();
    let dia = DiaMatrix::from_csr(&csr);
    assert_eq!(dia.to_csr(), csr);
}

#[test]
fn test_bsr_round_trip() {
    let csr: CsMat<f64> = create_test_triplets().to_csr();
    for block in [(1, 1), (2, 2), (3, 3), (2, 3)] {
        let bsr = BsrMatrix::from_csr(&csr, block);
        assert_eq!(bsr.to_csr(), csr, "block {block:?}");
    }
}

#[test]
fn test_lil_and_dok_round_trip() {
    let csr: CsMat<f64> = create_test_triplets().to_csr();
    assert_eq!(LilMatrix::from_csr(&csr).to_csr(), csr);
    assert_eq!(DokMatrix::from_csr(&csr).to_csr(), csr);
}

#[test]
fn test_binary_ops_reject_mixed_formats() {
    let tri = create_test_triplets();
    let csr = SparseMatrix::from_triplets(&tri, StorageFormat::Csr, 2);
    let lil = SparseMatrix::from_triplets(&tri, StorageFormat::Lil, 2);
    assert!(csr.add(&lil).is_err());
    assert!(Operation::MatrixMatrix
        .apply(&Operands::Binary(&csr, &lil))
        .is_err());
}

#[test]
fn test_operands_of_wrong_kind_are_rejected() {
    let tri = create_test_triplets();
    let a = SparseMatrix::from_triplets(&tri, StorageFormat::Dok, 2);
    assert!(Operation::Add.apply(&Operands::Unary(&a)).is_err());
    assert!(Operation::Transpose.apply(&Operands::Scalar(2.0, &a)).is_err());
}
