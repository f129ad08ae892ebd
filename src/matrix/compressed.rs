//! CSR and CSC storage, both backed by `sprs::CsMat`
//!
//! The storage order of the `CsMat` decides which of the two formats a value
//! represents. Row access is a slice on CSR and a search per column on CSC,
//! and the reverse holds for column access.

use super::{SparseMatrix, SparseStorage};
use ndarray::Array1;
use sprs::{CsMat, CsVec};

/// Collects position `inner` of every outer slice, i.e. a row of a CSC
/// matrix or a column of a CSR matrix
fn gather_inner(matrix: &CsMat<f64>, inner: usize) -> CsVec<f64> {
    let mut indices = Vec::new();
    let mut data = Vec::new();
    for (outer, lane) in matrix.outer_iterator().enumerate() {
        if let Some(&val) = lane.get(inner) {
            indices.push(outer);
            data.push(val);
        }
    }
    CsVec::new(matrix.outer_dims(), indices, data)
}

/// Copies outer slice `outer`, i.e. a row of a CSR matrix or a column of a
/// CSC matrix
fn copy_outer(matrix: &CsMat<f64>, outer: usize) -> CsVec<f64> {
    match matrix.outer_view(outer) {
        Some(lane) => lane.to_owned(),
        None => CsVec::empty(matrix.inner_dims()),
    }
}

impl SparseStorage for CsMat<f64> {
    fn shape(&self) -> (usize, usize) {
        CsMat::shape(self)
    }

    fn nnz(&self) -> usize {
        CsMat::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        let nnz = CsMat::nnz(self);
        (self.outer_dims() + 1 + nnz) * std::mem::size_of::<usize>()
            + nnz * std::mem::size_of::<f64>()
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        if self.is_csr() {
            self.clone()
        } else {
            self.to_csr()
        }
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::from_compressed(self.map(|&v| v * factor))
    }

    /// Transposing swaps the storage order, so CSR comes back as CSC
    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::from_compressed(self.transpose_view().to_owned())
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        if self.is_csr() {
            copy_outer(self, i)
        } else {
            gather_inner(self, i)
        }
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        if self.is_csc() {
            copy_outer(self, j)
        } else {
            gather_inner(self, j)
        }
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        self * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    //    [1 2 0]
    //    [0 3 0]
    //    [4 0 5]
    fn sample_csr() -> CsMat<f64> {
        let tri = TriMat::from_triplets(
            (3, 3),
            vec![0, 0, 1, 2, 2],
            vec![0, 1, 1, 0, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        );
        tri.to_csr()
    }

    #[test]
    fn test_rows_and_columns_in_both_orders() {
        let csr = sample_csr();
        let csc = csr.to_csc();

        for m in [&csr, &csc] {
            let row = SparseStorage::row(m, 2);
            assert_eq!(row.indices(), &[0, 2]);
            assert_eq!(row.data(), &[4.0, 5.0]);

            let col = SparseStorage::col(m, 1);
            assert_eq!(col.dim(), 3);
            assert_eq!(col.indices(), &[0, 1]);
            assert_eq!(col.data(), &[2.0, 3.0]);
        }
    }

    #[test]
    fn test_transpose_swaps_storage() {
        let csr = sample_csr();
        let t = SparseStorage::transpose(&csr);
        assert!(matches!(t, SparseMatrix::Csc(_)));
        assert_eq!(t.to_dense(), csr.to_dense().t().to_owned());
    }

    #[test]
    fn test_mul_vec_and_scale() {
        let csr = sample_csr();
        let y = SparseStorage::mul_vec(&csr, &Array1::from(vec![1.0, 2.0, 3.0]));
        assert_eq!(y.to_vec(), vec![5.0, 6.0, 19.0]);

        let scaled = SparseStorage::scale(&csr.to_csc(), 2.0);
        assert!(matches!(scaled, SparseMatrix::Csc(_)));
        assert_eq!(scaled.to_dense()[[2, 2]], 10.0);
    }
}
