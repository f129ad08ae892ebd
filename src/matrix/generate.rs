//! Seeded generators for synthetic input matrices
//!
//! Used by the benches and the tests; every generator is deterministic for a
//! given seed.

use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sprs::TriMat;
use std::collections::BTreeSet;

/// Generates random sparse matrices as triplets
pub struct MatrixGenerator {
    rng: ChaCha8Rng,
}

impl MatrixGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniformly scattered entries with the given density
    ///
    /// Every row gets the same number of distinct columns, at least one.
    pub fn generate_random(&mut self, n_rows: usize, n_cols: usize, density: f64) -> TriMat<f64> {
        let per_row = ((n_cols as f64 * density).round() as usize).clamp(1, n_cols.max(1));
        let val_dist = Uniform::from(-10.0..10.0);
        let mut tri = TriMat::with_capacity((n_rows, n_cols), n_rows * per_row);

        if n_cols == 0 {
            return tri;
        }
        for i in 0..n_rows {
            let mut cols = BTreeSet::new();
            while cols.len() < per_row {
                cols.insert(self.rng.gen_range(0..n_cols));
            }
            for j in cols {
                tri.add_triplet(i, j, val_dist.sample(&mut self.rng));
            }
        }
        tri
    }

    /// Square matrix with `bandwidth` diagonals centered on the main diagonal
    pub fn generate_banded(&mut self, n: usize, bandwidth: usize) -> TriMat<f64> {
        let val_dist = Uniform::from(-10.0..10.0);
        let mut tri = TriMat::with_capacity((n, n), n * (bandwidth + 1));

        for i in 0..n {
            let col_start = i.saturating_sub(bandwidth / 2);
            let col_end = (i + bandwidth / 2 + 1).min(n);
            for j in col_start..col_end {
                tri.add_triplet(i, j, val_dist.sample(&mut self.rng));
            }
        }
        tri
    }

    /// Square matrix made of dense `block_size × block_size` blocks on the diagonal
    pub fn generate_block_diagonal(&mut self, n: usize, block_size: usize) -> TriMat<f64> {
        let block_size = block_size.max(1);
        let val_dist = Uniform::from(-10.0..10.0);
        let mut tri = TriMat::with_capacity((n, n), n * block_size);

        for start in (0..n).step_by(block_size) {
            let end = (start + block_size).min(n);
            for i in start..end {
                for j in start..end {
                    tri.add_triplet(i, j, val_dist.sample(&mut self.rng));
                }
            }
        }
        tri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_matrix() {
        let a = MatrixGenerator::new(7).generate_random(20, 30, 0.1);
        let b = MatrixGenerator::new(7).generate_random(20, 30, 0.1);
        assert_eq!(a.row_inds(), b.row_inds());
        assert_eq!(a.col_inds(), b.col_inds());
        assert_eq!(a.data(), b.data());
        assert_eq!(a.nnz(), 20 * 3);
    }

    #[test]
    fn test_banded_stays_in_band() {
        let tri = MatrixGenerator::new(1).generate_banded(10, 3);
        // 3 entries per row, minus the two clipped corners
        assert_eq!(tri.nnz(), 28);
        for (&i, &j) in tri.row_inds().iter().zip(tri.col_inds()) {
            assert!((i as isize - j as isize).abs() <= 1);
        }
    }

    #[test]
    fn test_block_diagonal() {
        let tri = MatrixGenerator::new(3).generate_block_diagonal(5, 2);
        assert_eq!(tri.nnz(), 4 + 4 + 1);
        for (&i, &j) in tri.row_inds().iter().zip(tri.col_inds()) {
            assert_eq!(i / 2, j / 2);
        }
    }
}
