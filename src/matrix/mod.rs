// Sparse matrix storage formats and the operations benchmarked on them

pub mod bsr;
pub mod compressed;
pub mod conversion;
pub mod coo;
pub mod dia;
pub mod dok;
pub mod generate;
pub mod lil;
pub mod ops;

pub use bsr::{fit_block_dim, BsrMatrix};
pub use coo::clone_triplets;
pub use dia::DiaMatrix;
pub use dok::DokMatrix;
pub use generate::MatrixGenerator;
pub use lil::LilMatrix;

use crate::error::{BenchError, MatrixError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use sprs::{CsMat, CsVec, TriMat};
use std::fmt;
use std::str::FromStr;

/// The storage formats the harness can benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    Coo,
    Csr,
    Csc,
    Dia,
    Bsr,
    Lil,
    Dok,
}

impl StorageFormat {
    /// Every format, in the order used for `--format all`
    pub const ALL: [StorageFormat; 7] = [
        StorageFormat::Coo,
        StorageFormat::Csr,
        StorageFormat::Csc,
        StorageFormat::Dia,
        StorageFormat::Bsr,
        StorageFormat::Lil,
        StorageFormat::Dok,
    ];

    /// Short identifier used on the command line and in result files
    pub fn id(self) -> &'static str {
        match self {
            StorageFormat::Coo => "coo",
            StorageFormat::Csr => "csr",
            StorageFormat::Csc => "csc",
            StorageFormat::Dia => "dia",
            StorageFormat::Bsr => "bsr",
            StorageFormat::Lil => "lil",
            StorageFormat::Dok => "dok",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StorageFormat::Coo => "COOrdinate format",
            StorageFormat::Csr => "Compressed Sparse Row format",
            StorageFormat::Csc => "Compressed Sparse Column format",
            StorageFormat::Dia => "DIAgonal format",
            StorageFormat::Bsr => "Block Sparse Row format",
            StorageFormat::Lil => "List of Lists format",
            StorageFormat::Dok => "Dictionary Of Keys format",
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StorageFormat {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        StorageFormat::ALL
            .iter()
            .copied()
            .find(|format| format.id() == id)
            .ok_or_else(|| BenchError::InvalidInputFormat(format!("unknown storage format '{}'", s)))
    }
}

/// Behaviour every storage format provides natively
///
/// Everything here works on `f64` values. Index and length checks happen in
/// [`SparseMatrix`]; implementations may assume valid arguments.
pub trait SparseStorage {
    /// (rows, columns)
    fn shape(&self) -> (usize, usize);

    /// Number of explicitly stored values
    fn nnz(&self) -> usize;

    /// Bytes of heap memory held by the index and value arrays
    fn heap_bytes(&self) -> usize;

    /// Copy of the matrix in CSR layout
    fn to_csr_matrix(&self) -> CsMat<f64>;

    /// Matrix with every value multiplied by `factor`
    fn scale(&self, factor: f64) -> SparseMatrix;

    fn transpose(&self) -> SparseMatrix;

    /// Row `i` as a sparse vector of length `cols`
    fn row(&self, i: usize) -> CsVec<f64>;

    /// Column `j` as a sparse vector of length `rows`
    fn col(&self, j: usize) -> CsVec<f64>;

    /// Dense product `A * x`
    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64>;
}

/// A matrix held in one of the benchmarked storage formats
#[derive(Debug)]
pub enum SparseMatrix {
    Coo(TriMat<f64>),
    Csr(CsMat<f64>),
    Csc(CsMat<f64>),
    Dia(DiaMatrix<f64>),
    Bsr(BsrMatrix<f64>),
    Lil(LilMatrix<f64>),
    Dok(DokMatrix<f64>),
}

impl Clone for SparseMatrix {
    fn clone(&self) -> Self {
        match self {
            SparseMatrix::Coo(m) => SparseMatrix::Coo(clone_triplets(m)),
            SparseMatrix::Csr(m) => SparseMatrix::Csr(m.clone()),
            SparseMatrix::Csc(m) => SparseMatrix::Csc(m.clone()),
            SparseMatrix::Dia(m) => SparseMatrix::Dia(m.clone()),
            SparseMatrix::Bsr(m) => SparseMatrix::Bsr(m.clone()),
            SparseMatrix::Lil(m) => SparseMatrix::Lil(m.clone()),
            SparseMatrix::Dok(m) => SparseMatrix::Dok(m.clone()),
        }
    }
}

impl SparseMatrix {
    /// Builds a matrix in `format` from loaded triplets
    ///
    /// Duplicate triplets are summed, except for COO which keeps them as they are.
    /// BSR blocks are `bsr_block` wide and high, shrunk to the largest divisor
    /// of each matrix dimension when needed.
    pub fn from_triplets(triplets: &TriMat<f64>, format: StorageFormat, bsr_block: usize) -> Self {
        if format == StorageFormat::Coo {
            return SparseMatrix::Coo(clone_triplets(triplets));
        }
        if format == StorageFormat::Csc {
            return SparseMatrix::Csc(triplets.to_csc());
        }

        let csr: CsMat<f64> = triplets.to_csr();
        match format {
            StorageFormat::Dia => SparseMatrix::Dia(DiaMatrix::from_csr(&csr)),
            StorageFormat::Bsr => {
                let (rows, cols) = csr.shape();
                let block = (fit_block_dim(rows, bsr_block), fit_block_dim(cols, bsr_block));
                SparseMatrix::Bsr(BsrMatrix::from_csr(&csr, block))
            }
            StorageFormat::Lil => SparseMatrix::Lil(LilMatrix::from_csr(&csr)),
            StorageFormat::Dok => SparseMatrix::Dok(DokMatrix::from_csr(&csr)),
            _ => SparseMatrix::Csr(csr),
        }
    }

    /// Wraps a compressed matrix, keeping its storage order
    pub fn from_compressed(matrix: CsMat<f64>) -> Self {
        if matrix.is_csr() {
            SparseMatrix::Csr(matrix)
        } else {
            SparseMatrix::Csc(matrix)
        }
    }

    pub fn format(&self) -> StorageFormat {
        match self {
            SparseMatrix::Coo(_) => StorageFormat::Coo,
            SparseMatrix::Csr(_) => StorageFormat::Csr,
            SparseMatrix::Csc(_) => StorageFormat::Csc,
            SparseMatrix::Dia(_) => StorageFormat::Dia,
            SparseMatrix::Bsr(_) => StorageFormat::Bsr,
            SparseMatrix::Lil(_) => StorageFormat::Lil,
            SparseMatrix::Dok(_) => StorageFormat::Dok,
        }
    }

    /// The native implementation behind this matrix
    pub fn storage(&self) -> &dyn SparseStorage {
        match self {
            SparseMatrix::Coo(m) => m,
            SparseMatrix::Csr(m) | SparseMatrix::Csc(m) => m,
            SparseMatrix::Dia(m) => m,
            SparseMatrix::Bsr(m) => m,
            SparseMatrix::Lil(m) => m,
            SparseMatrix::Dok(m) => m,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.storage().shape()
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }

    pub fn nnz(&self) -> usize {
        self.storage().nnz()
    }

    /// Size in bytes of one stored value
    pub fn element_size(&self) -> usize {
        std::mem::size_of::<f64>()
    }

    pub fn heap_bytes(&self) -> usize {
        self.storage().heap_bytes()
    }

    /// Row `i` as a sparse vector
    pub fn row(&self, i: usize) -> Result<CsVec<f64>, MatrixError> {
        let bound = self.rows();
        if i >= bound {
            return Err(MatrixError::IndexOutOfRange { index: i, bound });
        }
        Ok(self.storage().row(i))
    }

    /// Column `j` as a sparse vector
    pub fn col(&self, j: usize) -> Result<CsVec<f64>, MatrixError> {
        let bound = self.cols();
        if j >= bound {
            return Err(MatrixError::IndexOutOfRange { index: j, bound });
        }
        Ok(self.storage().col(j))
    }

    pub fn scale(&self, factor: f64) -> SparseMatrix {
        self.storage().scale(factor)
    }

    pub fn transpose(&self) -> SparseMatrix {
        self.storage().transpose()
    }

    /// Dense product `A * x`
    pub fn mul_vec(&self, x: &Array1<f64>) -> Result<Array1<f64>, MatrixError> {
        let cols = self.cols();
        if x.len() != cols {
            return Err(MatrixError::VectorLength { len: x.len(), cols });
        }
        Ok(self.storage().mul_vec(x))
    }

    /// Copy of the matrix in CSR layout
    pub fn to_csr(&self) -> CsMat<f64> {
        match self {
            SparseMatrix::Csr(m) => m.clone(),
            other => other.storage().to_csr_matrix(),
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        self.to_csr().to_dense()
    }
}

/// Runs `f` on the contiguous storage of `x`, copying only when it is strided
pub(crate) fn with_slice<R>(x: &Array1<f64>, f: impl FnOnce(&[f64]) -> R) -> R {
    match x.as_slice() {
        Some(slice) => f(slice),
        None => f(&x.to_vec()),
    }
}

/// Sparse vector from sorted (index, value) pairs
pub(crate) fn sparse_vec(dim: usize, entries: Vec<(usize, f64)>) -> CsVec<f64> {
    let (indices, data): (Vec<usize>, Vec<f64>) = entries.into_iter().unzip();
    CsVec::new(dim, indices, data)
}

impl SparseStorage for DiaMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn nnz(&self) -> usize {
        DiaMatrix::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        self.offsets.len() * std::mem::size_of::<isize>()
            + self.data.len() * std::mem::size_of::<f64>()
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        self.to_csr()
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::Dia(DiaMatrix::scale(self, factor))
    }

    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::Dia(DiaMatrix::transpose(self))
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        sparse_vec(self.n_cols, self.row_entries(i))
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        sparse_vec(self.n_rows, self.col_entries(j))
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from(with_slice(x, |x| DiaMatrix::mul_vec(self, x)))
    }
}

impl SparseStorage for BsrMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn nnz(&self) -> usize {
        BsrMatrix::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        (self.indptr.len() + self.indices.len()) * std::mem::size_of::<usize>()
            + self.data.len() * std::mem::size_of::<f64>()
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        self.to_csr()
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::Bsr(BsrMatrix::scale(self, factor))
    }

    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::Bsr(BsrMatrix::transpose(self))
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        sparse_vec(self.n_cols, self.row_entries(i))
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        sparse_vec(self.n_rows, self.col_entries(j))
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from(with_slice(x, |x| BsrMatrix::mul_vec(self, x)))
    }
}

impl SparseStorage for LilMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn nnz(&self) -> usize {
        LilMatrix::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        // Two outer vectors of row headers plus the row contents
        let headers = 2 * self.n_rows * std::mem::size_of::<Vec<usize>>();
        let contents: usize = self
            .rows
            .iter()
            .zip(&self.data)
            .map(|(cols, vals)| {
                cols.capacity() * std::mem::size_of::<usize>()
                    + vals.capacity() * std::mem::size_of::<f64>()
            })
            .sum();
        headers + contents
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        self.to_csr()
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::Lil(LilMatrix::scale(self, factor))
    }

    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::Lil(LilMatrix::transpose(self))
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        CsVec::new(self.n_cols, self.rows[i].clone(), self.data[i].clone())
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        sparse_vec(self.n_rows, self.col_entries(j))
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from(with_slice(x, |x| LilMatrix::mul_vec(self, x)))
    }
}

impl SparseStorage for DokMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn nnz(&self) -> usize {
        DokMatrix::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        // Key, value and one control byte per bucket
        let bucket = std::mem::size_of::<((usize, usize), f64)>() + 1;
        self.entries.capacity() * bucket
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        self.to_csr()
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::Dok(DokMatrix::scale(self, factor))
    }

    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::Dok(DokMatrix::transpose(self))
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        sparse_vec(self.n_cols, self.row_entries(i))
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        sparse_vec(self.n_rows, self.col_entries(j))
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from(with_slice(x, |x| DokMatrix::mul_vec(self, x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //    [1 0 2]
    //    [0 0 3]
    //    [4 5 0]
    fn triplets() -> TriMat<f64> {
        TriMat::from_triplets(
            (3, 3),
            vec![0, 0, 1, 2, 2],
            vec![0, 2, 2, 0, 1],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
    }

    #[test]
    fn test_format_ids_round_trip() {
        for format in StorageFormat::ALL {
            assert_eq!(format.id().parse::<StorageFormat>().unwrap(), format);
        }
        assert_eq!("CSR".parse::<StorageFormat>().unwrap(), StorageFormat::Csr);
        assert!(matches!(
            "ell".parse::<StorageFormat>(),
            Err(BenchError::InvalidInputFormat(_))
        ));
    }

    #[test]
    fn test_every_format_holds_the_same_matrix() {
        let csr: CsMat<f64> = triplets().to_csr();
        let reference = csr.to_dense();
        for format in StorageFormat::ALL {
            let m = SparseMatrix::from_triplets(&triplets(), format, 2);
            assert_eq!(m.format(), format);
            assert_eq!(m.shape(), (3, 3));
            assert_eq!(m.to_dense(), reference, "format {}", format);
        }
    }

    #[test]
    fn test_clone_in_every_format() {
        for format in StorageFormat::ALL {
            let m = SparseMatrix::from_triplets(&triplets(), format, 2);
            let copy = m.clone();
            assert_eq!(copy.format(), format);
            assert_eq!(copy.nnz(), m.nnz());
            assert_eq!(copy.to_dense(), m.to_dense(), "format {}", format);
        }
    }

    #[test]
    fn test_row_and_column_bounds() {
        let m = SparseMatrix::from_triplets(&triplets(), StorageFormat::Dok, 2);
        assert_eq!(m.row(2).unwrap().indices(), &[0, 1]);
        assert_eq!(m.col(2).unwrap().data(), &[2.0, 3.0]);
        assert_eq!(
            m.row(3).unwrap_err(),
            MatrixError::IndexOutOfRange { index: 3, bound: 3 }
        );
    }

    #[test]
    fn test_mul_vec_checks_length() {
        let m = SparseMatrix::from_triplets(&triplets(), StorageFormat::Lil, 2);
        let err = m.mul_vec(&Array1::from(vec![1.0, 2.0])).unwrap_err();
        assert_eq!(err, MatrixError::VectorLength { len: 2, cols: 3 });
    }

    #[test]
    fn test_bsr_block_shrinks_to_fit() {
        match SparseMatrix::from_triplets(&triplets(), StorageFormat::Bsr, 2) {
            SparseMatrix::Bsr(m) => assert_eq!((m.block_rows, m.block_cols), (1, 1)),
            other => panic!("expected BSR, got {:?}", other.format()),
        }
    }
}
