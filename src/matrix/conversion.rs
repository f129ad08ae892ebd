//! Conversion functions between the native formats and sprs CSR matrices
//!
//! CSR is the hub format: every native format can be built from a CSR matrix
//! and turned back into one. Conversions keep explicit entries as they are
//! and never reorder values within a row.

use crate::matrix::{BsrMatrix, DiaMatrix, DokMatrix, LilMatrix};
use num_traits::Num;
use sprs::CsMat;
use std::collections::{BTreeMap, BTreeSet};

/// Assembles a CSR matrix from rows of sorted (column, value) pairs
fn csr_from_rows<T, I>(n_rows: usize, n_cols: usize, rows: I) -> CsMat<T>
where
    T: Copy + Num + Default,
    I: IntoIterator<Item = Vec<(usize, T)>>,
{
    let mut indptr = Vec::with_capacity(n_rows + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();

    indptr.push(0);
    for row in rows {
        for (col, val) in row {
            indices.push(col);
            data.push(val);
        }
        indptr.push(indices.len());
    }

    CsMat::new((n_rows, n_cols), indptr, indices, data)
}

/// Makes sure we iterate a matrix by rows
fn as_csr<T>(matrix: &CsMat<T>) -> std::borrow::Cow<'_, CsMat<T>>
where
    T: Copy + Num + Default,
{
    if matrix.is_csr() {
        std::borrow::Cow::Borrowed(matrix)
    } else {
        std::borrow::Cow::Owned(matrix.to_csr())
    }
}

impl<T: Copy + Num + Default> DiaMatrix<T> {
    /// Builds a DIA matrix holding one lane for every occupied diagonal
    pub fn from_csr(matrix: &CsMat<T>) -> Self {
        let matrix = as_csr(matrix);
        let (n_rows, n_cols) = matrix.shape();

        let mut occupied = BTreeSet::new();
        for (i, row) in matrix.outer_iterator().enumerate() {
            for (j, _) in row.iter() {
                occupied.insert(j as isize - i as isize);
            }
        }
        let offsets: Vec<isize> = occupied.into_iter().collect();

        let mut data = vec![T::zero(); offsets.len() * n_cols];
        for (i, row) in matrix.outer_iterator().enumerate() {
            for (j, &val) in row.iter() {
                let offset = j as isize - i as isize;
                // Offsets were collected from these very entries
                if let Ok(k) = offsets.binary_search(&offset) {
                    data[k * n_cols + j] = val;
                }
            }
        }

        DiaMatrix::new(n_rows, n_cols, offsets, data)
    }

    /// Converts back to CSR, dropping padding and stored zeros
    pub fn to_csr(&self) -> CsMat<T> {
        csr_from_rows(
            self.n_rows,
            self.n_cols,
            (0..self.n_rows).map(|i| self.row_entries(i)),
        )
    }
}

impl<T: Copy + Num + Default> BsrMatrix<T> {
    /// Builds a BSR matrix with `block_rows × block_cols` tiles
    ///
    /// # Panics
    ///
    /// Panics if the block dimensions do not divide the matrix dimensions.
    pub fn from_csr(matrix: &CsMat<T>, (block_rows, block_cols): (usize, usize)) -> Self {
        let matrix = as_csr(matrix);
        let (n_rows, n_cols) = matrix.shape();
        assert!(block_rows > 0 && block_cols > 0, "block dimensions must be positive");
        assert_eq!(n_rows % block_rows, 0, "block_rows must divide n_rows");
        assert_eq!(n_cols % block_cols, 0, "block_cols must divide n_cols");

        let block_size = block_rows * block_cols;
        let n_block_rows = n_rows / block_rows;

        let mut indptr = Vec::with_capacity(n_block_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for br in 0..n_block_rows {
            // Dense tiles of this block row, keyed by block column
            let mut tiles: BTreeMap<usize, Vec<T>> = BTreeMap::new();
            for r in 0..block_rows {
                let i = br * block_rows + r;
                if let Some(row) = matrix.outer_view(i) {
                    for (j, &val) in row.iter() {
                        let tile = tiles
                            .entry(j / block_cols)
                            .or_insert_with(|| vec![T::zero(); block_size]);
                        tile[r * block_cols + j % block_cols] = val;
                    }
                }
            }
            for (bc, tile) in tiles {
                indices.push(bc);
                data.extend(tile);
            }
            indptr.push(indices.len());
        }

        BsrMatrix::new(n_rows, n_cols, (block_rows, block_cols), indptr, indices, data)
    }

    /// Converts back to CSR, dropping zeros stored inside blocks
    pub fn to_csr(&self) -> CsMat<T> {
        csr_from_rows(
            self.n_rows,
            self.n_cols,
            (0..self.n_rows).map(|i| self.row_entries(i)),
        )
    }
}

impl<T: Copy + Num + Default> LilMatrix<T> {
    pub fn from_csr(matrix: &CsMat<T>) -> Self {
        let matrix = as_csr(matrix);
        let (n_rows, n_cols) = matrix.shape();

        let mut rows = Vec::with_capacity(n_rows);
        let mut data = Vec::with_capacity(n_rows);
        for row in matrix.outer_iterator() {
            rows.push(row.indices().to_vec());
            data.push(row.data().to_vec());
        }

        LilMatrix::new(n_rows, n_cols, rows, data)
    }

    pub fn to_csr(&self) -> CsMat<T> {
        csr_from_rows(
            self.n_rows,
            self.n_cols,
            (0..self.n_rows).map(|i| self.row_iter(i).collect()),
        )
    }
}

impl<T: Copy + Num + Default> DokMatrix<T> {
    pub fn from_csr(matrix: &CsMat<T>) -> Self {
        let (n_rows, n_cols) = matrix.shape();
        let mut result = DokMatrix::with_capacity(n_rows, n_cols, matrix.nnz());
        for (&val, (i, j)) in matrix.iter() {
            result.entries.insert((i, j), val);
        }
        result
    }

    /// Converts to CSR by sorting the keys row-major
    pub fn to_csr(&self) -> CsMat<T> {
        let mut rows = vec![Vec::new(); self.n_rows];
        for ((i, j), val) in self.sorted_entries() {
            rows[i].push((j, val));
        }
        csr_from_rows(self.n_rows, self.n_cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    //    [1 2 0 0]
    //    [0 3 0 0]
    //    [4 0 5 0]
    //    [0 0 0 6]
    fn sample() -> CsMat<f64> {
        let mut tri = TriMat::new((4, 4));
        for &(i, j, v) in &[
            (0, 0, 1.0),
            (0, 1, 2.0),
            (1, 1, 3.0),
            (2, 0, 4.0),
            (2, 2, 5.0),
            (3, 3, 6.0),
        ] {
            tri.add_triplet(i, j, v);
        }
        tri.to_csr()
    }

    #[test]
    fn test_dia_conversion() {
        let csr = sample();
        let dia = DiaMatrix::from_csr(&csr);
        assert_eq!(dia.offsets, vec![-2, 0, 1]);
        assert_eq!(dia.nnz(), 6);
        assert_eq!(dia.get(2, 0), 4.0);
        assert_eq!(dia.to_csr(), csr);
    }

    #[test]
    fn test_bsr_conversion() {
        let csr = sample();
        let bsr = BsrMatrix::from_csr(&csr, (2, 2));
        // Blocks (0,0), (1,0) and (1,1) are occupied
        assert_eq!(bsr.indptr, vec![0, 1, 3]);
        assert_eq!(bsr.indices, vec![0, 0, 1]);
        assert_eq!(bsr.block(0), &[1.0, 2.0, 0.0, 3.0]);
        assert_eq!(bsr.to_csr(), csr);
    }

    #[test]
    fn test_lil_and_dok_conversion() {
        let csr = sample();

        let lil = LilMatrix::from_csr(&csr);
        assert_eq!(lil.rows[2], vec![0, 2]);
        assert_eq!(lil.to_csr(), csr);

        let dok = DokMatrix::from_csr(&csr);
        assert_eq!(dok.nnz(), 6);
        assert_eq!(dok.get(3, 3), 6.0);
        assert_eq!(dok.to_csr(), csr);
    }

    #[test]
    fn test_conversion_from_csc_input() {
        let csr = sample();
        let csc = csr.to_csc();
        assert_eq!(LilMatrix::from_csr(&csc).to_csr(), csr);
        assert_eq!(DiaMatrix::from_csr(&csc).to_csr(), csr);
    }
}
