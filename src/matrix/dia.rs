//! Diagonal (DIA) storage format implementation

use num_traits::Num;
use std::fmt;

/// A sparse matrix stored by diagonals
///
/// The DIA format keeps one dense lane per occupied diagonal:
/// - offsets: Diagonal offsets (`col - row`), sorted ascending
/// - data: `offsets.len() * n_cols` values, one lane of length n_cols per diagonal
///
/// Lane `k` stores the element `A[j - offsets[k], j]` at position `j`, so all
/// lanes are indexed by column. Positions that fall outside the matrix are padding.
#[derive(Clone, PartialEq)]
pub struct DiaMatrix<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Diagonal offsets, 0 is the main diagonal, positive offsets lie above it
    pub offsets: Vec<isize>,

    /// Diagonal lanes, row-major by diagonal (size: offsets.len() * n_cols)
    pub data: Vec<T>,
}

impl<T> DiaMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a new DIA matrix from its offsets and lanes
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - data.len() is not offsets.len() * n_cols
    /// - offsets are not strictly increasing
    pub fn new(n_rows: usize, n_cols: usize, offsets: Vec<isize>, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            offsets.len() * n_cols,
            "data.len() must be offsets.len() * n_cols"
        );
        assert!(
            offsets.windows(2).all(|w| w[0] < w[1]),
            "offsets must be strictly increasing"
        );

        Self {
            n_rows,
            n_cols,
            offsets,
            data,
        }
    }

    /// Number of stored diagonals
    pub fn n_diags(&self) -> usize {
        self.offsets.len()
    }

    /// The lane of diagonal `k`, indexed by column
    pub fn lane(&self, k: usize) -> &[T] {
        &self.data[k * self.n_cols..(k + 1) * self.n_cols]
    }

    /// Range of columns where the diagonal with `offset` lies inside the matrix
    pub fn column_range(&self, offset: isize) -> std::ops::Range<usize> {
        let start = offset.max(0) as usize;
        let end = (self.n_rows as isize + offset).clamp(0, self.n_cols as isize) as usize;
        start.min(end)..end
    }

    /// Returns the number of non-zero values inside the matrix bounds
    pub fn nnz(&self) -> usize {
        (0..self.n_diags())
            .map(|k| {
                let lane = self.lane(k);
                self.column_range(self.offsets[k])
                    .filter(|&j| !lane[j].is_zero())
                    .count()
            })
            .sum()
    }

    /// Returns the element at (i, j), zero when nothing is stored there
    pub fn get(&self, i: usize, j: usize) -> T {
        let offset = j as isize - i as isize;
        match self.offsets.binary_search(&offset) {
            Ok(k) => self.lane(k)[j],
            Err(_) => T::zero(),
        }
    }

    /// Non-zero entries of row i as sorted (column, value) pairs
    pub fn row_entries(&self, i: usize) -> Vec<(usize, T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        // Offsets are ascending, so columns come out ascending as well
        let mut entries = Vec::new();
        for (k, &offset) in self.offsets.iter().enumerate() {
            let j = i as isize + offset;
            if j < 0 || j >= self.n_cols as isize {
                continue;
            }
            let val = self.lane(k)[j as usize];
            if !val.is_zero() {
                entries.push((j as usize, val));
            }
        }
        entries
    }

    /// Non-zero entries of column j as sorted (row, value) pairs
    pub fn col_entries(&self, j: usize) -> Vec<(usize, T)> {
        assert!(j < self.n_cols, "Column index out of bounds");

        // Ascending offsets give descending rows; walk the diagonals backwards
        let mut entries = Vec::new();
        for (k, &offset) in self.offsets.iter().enumerate().rev() {
            let i = j as isize - offset;
            if i < 0 || i >= self.n_rows as isize {
                continue;
            }
            let val = self.lane(k)[j];
            if !val.is_zero() {
                entries.push((i as usize, val));
            }
        }
        entries
    }

    /// Computes y = A * x one diagonal at a time
    pub fn mul_vec(&self, x: &[T]) -> Vec<T> {
        assert_eq!(x.len(), self.n_cols, "x.len() must equal n_cols");

        let mut y = vec![T::zero(); self.n_rows];
        for (k, &offset) in self.offsets.iter().enumerate() {
            let lane = self.lane(k);
            for j in self.column_range(offset) {
                let i = (j as isize - offset) as usize;
                y[i] = y[i] + lane[j] * x[j];
            }
        }
        y
    }

    /// Multiplies every stored value by `factor`
    pub fn scale(&self, factor: T) -> Self {
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            offsets: self.offsets.clone(),
            data: self.data.iter().map(|&v| v * factor).collect(),
        }
    }

    /// Returns the transpose, still in DIA format
    ///
    /// Transposing negates every offset; lanes are re-indexed because they
    /// are keyed by column and the columns of A^T are the rows of A.
    pub fn transpose(&self) -> Self {
        let n_diags = self.n_diags();
        let new_cols = self.n_rows;
        let mut offsets = Vec::with_capacity(n_diags);
        let mut data = vec![T::zero(); n_diags * new_cols];

        // Walk the diagonals backwards so negated offsets stay ascending
        for (new_k, k) in (0..n_diags).rev().enumerate() {
            let offset = self.offsets[k];
            offsets.push(-offset);
            let lane = self.lane(k);
            for j in self.column_range(offset) {
                let i = (j as isize - offset) as usize;
                data[new_k * new_cols + i] = lane[j];
            }
        }

        Self::new(self.n_cols, self.n_rows, offsets, data)
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for DiaMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DiaMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  diagonals: {}", self.n_diags())?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_diags_to_print = 5.min(self.n_diags());
        for k in 0..max_diags_to_print {
            let range = self.column_range(self.offsets[k]);
            let shown = range.start..range.end.min(range.start + 5);
            writeln!(
                f,
                "    offset {}: {:?}",
                self.offsets[k],
                &self.lane(k)[shown]
            )?;
        }
        if self.n_diags() > max_diags_to_print {
            writeln!(
                f,
                "    ... ({} more diagonals)",
                self.n_diags() - max_diags_to_print
            )?;
        }

        write!(f, "}}")
    }
}
