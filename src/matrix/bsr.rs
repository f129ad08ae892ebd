//! Block Sparse Row (BSR) storage format implementation

use crate::utils::exclusive_scan;
use num_traits::Num;
use std::fmt;

/// A sparse matrix in Block Sparse Row (BSR) format
///
/// BSR is CSR over dense `block_rows × block_cols` tiles:
/// - indptr: Array of size n_block_rows + 1 with offsets into indices
/// - indices: Block column index of every stored block
/// - data: Stored blocks back to back, each one row-major
///
/// Both matrix dimensions must be multiples of the block dimensions.
#[derive(Clone, PartialEq)]
pub struct BsrMatrix<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Height of one block
    pub block_rows: usize,

    /// Width of one block
    pub block_cols: usize,

    /// Block row pointers (size: n_rows / block_rows + 1)
    pub indptr: Vec<usize>,

    /// Block column indices, sorted within each block row
    pub indices: Vec<usize>,

    /// Block values (size: indices.len() * block_rows * block_cols)
    pub data: Vec<T>,
}

impl<T> BsrMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a new BSR matrix
    ///
    /// # Panics
    ///
    /// Panics if the block dimensions do not divide the matrix dimensions or
    /// the arrays are inconsistent with each other.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        (block_rows, block_cols): (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<T>,
    ) -> Self {
        assert!(block_rows > 0 && block_cols > 0, "block dimensions must be positive");
        assert_eq!(n_rows % block_rows, 0, "block_rows must divide n_rows");
        assert_eq!(n_cols % block_cols, 0, "block_cols must divide n_cols");
        assert_eq!(
            indptr.len(),
            n_rows / block_rows + 1,
            "indptr.len() must be n_block_rows + 1"
        );
        assert_eq!(
            indptr[indptr.len() - 1],
            indices.len(),
            "last indptr entry must equal indices.len()"
        );
        assert_eq!(
            data.len(),
            indices.len() * block_rows * block_cols,
            "data.len() must be indices.len() * block size"
        );
        for &bc in &indices {
            assert!(
                bc < n_cols / block_cols,
                "Block column {} out of bounds",
                bc
            );
        }

        Self {
            n_rows,
            n_cols,
            block_rows,
            block_cols,
            indptr,
            indices,
            data,
        }
    }

    /// Number of block rows
    pub fn n_block_rows(&self) -> usize {
        self.n_rows / self.block_rows
    }

    /// Number of block columns
    pub fn n_block_cols(&self) -> usize {
        self.n_cols / self.block_cols
    }

    /// Number of stored blocks
    pub fn n_blocks(&self) -> usize {
        self.indices.len()
    }

    /// Values of stored block `b`, row-major
    pub fn block(&self, b: usize) -> &[T] {
        let size = self.block_rows * self.block_cols;
        &self.data[b * size..(b + 1) * size]
    }

    /// Returns the number of explicitly stored values, zeros inside blocks included
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Non-zero entries of row i as sorted (column, value) pairs
    pub fn row_entries(&self, i: usize) -> Vec<(usize, T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let br = i / self.block_rows;
        let r = i % self.block_rows;
        let mut entries = Vec::new();
        for b in self.indptr[br]..self.indptr[br + 1] {
            let block = self.block(b);
            let col_base = self.indices[b] * self.block_cols;
            for c in 0..self.block_cols {
                let val = block[r * self.block_cols + c];
                if !val.is_zero() {
                    entries.push((col_base + c, val));
                }
            }
        }
        entries
    }

    /// Non-zero entries of column j as sorted (row, value) pairs
    pub fn col_entries(&self, j: usize) -> Vec<(usize, T)> {
        assert!(j < self.n_cols, "Column index out of bounds");

        let bc = j / self.block_cols;
        let c = j % self.block_cols;
        let mut entries = Vec::new();
        for br in 0..self.n_block_rows() {
            let start = self.indptr[br];
            let end = self.indptr[br + 1];
            if let Ok(pos) = self.indices[start..end].binary_search(&bc) {
                let block = self.block(start + pos);
                for r in 0..self.block_rows {
                    let val = block[r * self.block_cols + c];
                    if !val.is_zero() {
                        entries.push((br * self.block_rows + r, val));
                    }
                }
            }
        }
        entries
    }

    /// Computes y = A * x one dense block at a time
    pub fn mul_vec(&self, x: &[T]) -> Vec<T> {
        assert_eq!(x.len(), self.n_cols, "x.len() must equal n_cols");

        let mut y = vec![T::zero(); self.n_rows];
        for br in 0..self.n_block_rows() {
            let row_base = br * self.block_rows;
            for b in self.indptr[br]..self.indptr[br + 1] {
                let block = self.block(b);
                let col_base = self.indices[b] * self.block_cols;
                for r in 0..self.block_rows {
                    let mut acc = y[row_base + r];
                    for c in 0..self.block_cols {
                        acc = acc + block[r * self.block_cols + c] * x[col_base + c];
                    }
                    y[row_base + r] = acc;
                }
            }
        }
        y
    }

    /// Multiplies every stored value by `factor`
    pub fn scale(&self, factor: T) -> Self {
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            block_rows: self.block_rows,
            block_cols: self.block_cols,
            indptr: self.indptr.clone(),
            indices: self.indices.clone(),
            data: self.data.iter().map(|&v| v * factor).collect(),
        }
    }

    /// Returns the transpose, with transposed blocks
    pub fn transpose(&self) -> Self {
        let n_new_block_rows = self.n_block_cols();
        let block_size = self.block_rows * self.block_cols;

        // Count blocks per new block row, then place them in order
        let mut counts = vec![0; n_new_block_rows];
        for &bc in &self.indices {
            counts[bc] += 1;
        }
        let indptr = exclusive_scan(&counts);
        let mut next = indptr.clone();

        let mut indices = vec![0; self.n_blocks()];
        let mut data = vec![T::zero(); self.data.len()];

        for br in 0..self.n_block_rows() {
            for b in self.indptr[br]..self.indptr[br + 1] {
                let bc = self.indices[b];
                let pos = next[bc];
                next[bc] += 1;
                indices[pos] = br;

                let src = self.block(b);
                let dst = &mut data[pos * block_size..(pos + 1) * block_size];
                for r in 0..self.block_rows {
                    for c in 0..self.block_cols {
                        dst[c * self.block_rows + r] = src[r * self.block_cols + c];
                    }
                }
            }
        }

        Self::new(
            self.n_cols,
            self.n_rows,
            (self.block_cols, self.block_rows),
            indptr,
            indices,
            data,
        )
    }
}

/// Largest block dimension not above `preferred` that divides `n`
///
/// Falls back to 1, which always divides.
pub fn fit_block_dim(n: usize, preferred: usize) -> usize {
    (1..=preferred.max(1))
        .rev()
        .find(|&d| n % d == 0)
        .unwrap_or(1)
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for BsrMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BsrMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  block: {} × {}", self.block_rows, self.block_cols)?;
        writeln!(f, "  blocks: {}", self.n_blocks())?;

        let max_blocks_to_print = 3.min(self.n_blocks());
        for b in 0..max_blocks_to_print {
            writeln!(f, "    block col {}: {:?}", self.indices[b], self.block(b))?;
        }
        if self.n_blocks() > max_blocks_to_print {
            writeln!(f, "    ... ({} more blocks)", self.n_blocks() - max_blocks_to_print)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //    [1 2 0 0]
    //    [0 3 0 0]
    //    [0 0 4 0]
    //    [0 0 5 6]
    fn sample() -> BsrMatrix<i32> {
        BsrMatrix::new(
            4,
            4,
            (2, 2),
            vec![0, 1, 2],
            vec![0, 1],
            vec![1, 2, 0, 3, 4, 0, 5, 6],
        )
    }

    #[test]
    fn test_nnz_counts_zeros_inside_blocks() {
        assert_eq!(sample().nnz(), 8);
    }

    #[test]
    fn test_row_and_column_entries() {
        let m = sample();
        assert_eq!(m.row_entries(0), vec![(0, 1), (1, 2)]);
        assert_eq!(m.row_entries(3), vec![(2, 5), (3, 6)]);
        assert_eq!(m.col_entries(1), vec![(0, 2), (1, 3)]);
        assert_eq!(m.col_entries(2), vec![(2, 4), (3, 5)]);
    }

    #[test]
    fn test_mul_vec() {
        let m = sample();
        assert_eq!(m.mul_vec(&[1, 1, 1, 1]), vec![3, 3, 4, 11]);
    }

    #[test]
    fn test_transpose() {
        let t = sample().transpose();
        assert_eq!(t.indices, vec![0, 1]);
        assert_eq!(t.row_entries(1), vec![(0, 2), (1, 3)]);
        assert_eq!(t.row_entries(2), vec![(2, 4), (3, 5)]);
        assert_eq!(t.row_entries(3), vec![(3, 6)]);
    }

    #[test]
    fn test_transpose_off_diagonal_blocks() {
        // 2 x 4 with a single block in block column 1
        let m = BsrMatrix::new(2, 4, (2, 2), vec![0, 1], vec![1], vec![1, 2, 3, 4]);
        let t = m.transpose();
        assert_eq!((t.n_rows, t.n_cols), (4, 2));
        assert_eq!(t.indptr, vec![0, 0, 1]);
        assert_eq!(t.row_entries(2), vec![(0, 1), (1, 3)]);
        assert_eq!(t.row_entries(3), vec![(0, 2), (1, 4)]);
    }

    #[test]
    fn test_fit_block_dim() {
        assert_eq!(fit_block_dim(10, 2), 2);
        assert_eq!(fit_block_dim(9, 2), 1);
        assert_eq!(fit_block_dim(9, 4), 3);
        assert_eq!(fit_block_dim(7, 0), 1);
    }

    #[test]
    #[should_panic(expected = "block_rows must divide n_rows")]
    fn test_indivisible_block() {
        BsrMatrix::<i32>::new(3, 4, (2, 2), vec![0, 0], vec![], vec![]);
    }
}
