//! COO storage, backed by `sprs::TriMat`
//!
//! Triplets are kept exactly as loaded, duplicates included. Every native
//! operation treats duplicates as summed.

use super::{sparse_vec, with_slice, SparseMatrix, SparseStorage};
use ndarray::Array1;
use sprs::{CsMat, CsVec, TriMat};
use std::collections::BTreeMap;

/// Copies triplets one for one, duplicates included
///
/// `TriMat` has no `Clone` of its own.
pub fn clone_triplets(triplets: &TriMat<f64>) -> TriMat<f64> {
    TriMat::from_triplets(
        (triplets.rows(), triplets.cols()),
        triplets.row_inds().to_vec(),
        triplets.col_inds().to_vec(),
        triplets.data().to_vec(),
    )
}

/// Sums the values of all triplets accepted by `select`, keyed by the index it returns
fn collect_summed<F>(triplets: &TriMat<f64>, select: F) -> Vec<(usize, f64)>
where
    F: Fn(usize, usize) -> Option<usize>,
{
    let mut summed: BTreeMap<usize, f64> = BTreeMap::new();
    for ((&i, &j), &v) in triplets
        .row_inds()
        .iter()
        .zip(triplets.col_inds())
        .zip(triplets.data())
    {
        if let Some(key) = select(i, j) {
            *summed.entry(key).or_insert(0.0) += v;
        }
    }
    summed.into_iter().filter(|&(_, v)| v != 0.0).collect()
}

impl SparseStorage for TriMat<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    fn nnz(&self) -> usize {
        TriMat::nnz(self)
    }

    fn heap_bytes(&self) -> usize {
        TriMat::nnz(self) * (2 * std::mem::size_of::<usize>() + std::mem::size_of::<f64>())
    }

    fn to_csr_matrix(&self) -> CsMat<f64> {
        self.to_csr()
    }

    fn scale(&self, factor: f64) -> SparseMatrix {
        SparseMatrix::Coo(TriMat::from_triplets(
            (self.rows(), self.cols()),
            self.row_inds().to_vec(),
            self.col_inds().to_vec(),
            self.data().iter().map(|&v| v * factor).collect(),
        ))
    }

    /// Swaps the row and column arrays
    fn transpose(&self) -> SparseMatrix {
        SparseMatrix::Coo(TriMat::from_triplets(
            (self.cols(), self.rows()),
            self.col_inds().to_vec(),
            self.row_inds().to_vec(),
            self.data().to_vec(),
        ))
    }

    fn row(&self, i: usize) -> CsVec<f64> {
        sparse_vec(
            self.cols(),
            collect_summed(self, |r, c| (r == i).then_some(c)),
        )
    }

    fn col(&self, j: usize) -> CsVec<f64> {
        sparse_vec(
            self.rows(),
            collect_summed(self, |r, c| (c == j).then_some(r)),
        )
    }

    fn mul_vec(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut y = Array1::zeros(self.rows());
        with_slice(x, |x| {
            for ((&i, &j), &v) in self
                .row_inds()
                .iter()
                .zip(self.col_inds())
                .zip(self.data())
            {
                y[i] += v * x[j];
            }
        });
        y
    }
}
