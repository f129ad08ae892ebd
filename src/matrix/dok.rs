//! Dictionary of Keys (DOK) storage format implementation

use num_traits::Num;
use std::collections::HashMap;
use std::fmt;

/// A sparse matrix stored as a hash map from (row, col) to value
///
/// O(1) random access and updates; every structured traversal has to visit
/// the whole map and sort what it finds.
#[derive(Clone, PartialEq)]
pub struct DokMatrix<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Stored entries keyed by (row, col)
    pub entries: HashMap<(usize, usize), T>,
}

impl<T> DokMatrix<T>
where
    T: Copy + Num,
{
    /// Creates an empty matrix with the given dimensions
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            entries: HashMap::new(),
        }
    }

    /// Creates a DOK matrix with room for `capacity` entries
    pub fn with_capacity(n_rows: usize, n_cols: usize, capacity: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Adds `value` to the entry at (i, j)
    ///
    /// # Panics
    ///
    /// Panics if (i, j) lies outside the matrix.
    pub fn add_entry(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.n_rows && j < self.n_cols, "Entry ({}, {}) out of bounds", i, j);
        let slot = self.entries.entry((i, j)).or_insert_with(T::zero);
        *slot = *slot + value;
    }

    /// Returns the element at (i, j), zero when nothing is stored there
    pub fn get(&self, i: usize, j: usize) -> T {
        self.entries.get(&(i, j)).copied().unwrap_or_else(T::zero)
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Non-zero entries of row i as sorted (column, value) pairs
    pub fn row_entries(&self, i: usize) -> Vec<(usize, T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(&(r, _), v)| r == i && !v.is_zero())
            .map(|(&(_, c), &v)| (c, v))
            .collect();
        entries.sort_unstable_by_key(|&(c, _)| c);
        entries
    }

    /// Non-zero entries of column j as sorted (row, value) pairs
    pub fn col_entries(&self, j: usize) -> Vec<(usize, T)> {
        assert!(j < self.n_cols, "Column index out of bounds");

        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(&(_, c), v)| c == j && !v.is_zero())
            .map(|(&(r, _), &v)| (r, v))
            .collect();
        entries.sort_unstable_by_key(|&(r, _)| r);
        entries
    }

    /// Computes y = A * x
    pub fn mul_vec(&self, x: &[T]) -> Vec<T> {
        assert_eq!(x.len(), self.n_cols, "x.len() must equal n_cols");

        let mut y = vec![T::zero(); self.n_rows];
        for (&(i, j), &v) in &self.entries {
            y[i] = y[i] + v * x[j];
        }
        y
    }

    /// Multiplies every stored value by `factor`
    pub fn scale(&self, factor: T) -> Self {
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            entries: self
                .entries
                .iter()
                .map(|(&key, &v)| (key, v * factor))
                .collect(),
        }
    }

    /// Returns the transpose
    pub fn transpose(&self) -> Self {
        Self {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            entries: self
                .entries
                .iter()
                .map(|(&(i, j), &v)| ((j, i), v))
                .collect(),
        }
    }

    /// Element-wise combination of two matrices with the same shape
    ///
    /// `op` receives zero for entries present in only one operand. Results that
    /// are exactly zero are dropped.
    pub fn zip_with<F>(&self, other: &Self, op: F) -> Self
    where
        F: Fn(T, T) -> T,
    {
        assert_eq!(
            (self.n_rows, self.n_cols),
            (other.n_rows, other.n_cols),
            "operands must have the same shape"
        );

        let mut result = Self::with_capacity(self.n_rows, self.n_cols, self.nnz() + other.nnz());
        for (&key, &a) in &self.entries {
            let b = other.entries.get(&key).copied().unwrap_or_else(T::zero);
            let val = op(a, b);
            if !val.is_zero() {
                result.entries.insert(key, val);
            }
        }
        for (&key, &b) in &other.entries {
            if self.entries.contains_key(&key) {
                continue;
            }
            let val = op(T::zero(), b);
            if !val.is_zero() {
                result.entries.insert(key, val);
            }
        }
        result
    }

    /// Stored entries in row-major order
    pub fn sorted_entries(&self) -> Vec<((usize, usize), T)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        entries
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for DokMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DokMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let sorted = self.sorted_entries();
        let max_entries_to_print = 10.min(sorted.len());
        for ((i, j), v) in &sorted[..max_entries_to_print] {
            writeln!(f, "    ({}, {}): {:?}", i, j, v)?;
        }
        if sorted.len() > max_entries_to_print {
            writeln!(f, "    ... ({} more entries)", sorted.len() - max_entries_to_print)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //    [1 2 0]
    //    [0 3 0]
    //    [4 0 5]
    fn sample() -> DokMatrix<i32> {
        let mut m = DokMatrix::new(3, 3);
        for &(i, j, v) in &[(0, 0, 1), (0, 1, 2), (1, 1, 3), (2, 0, 4), (2, 2, 5)] {
            m.add_entry(i, j, v);
        }
        m
    }

    #[test]
    fn test_duplicates_are_summed() {
        let mut m = DokMatrix::new(2, 2);
        m.add_entry(0, 1, 2);
        m.add_entry(0, 1, 3);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 1), 5);
    }

    #[test]
    fn test_row_and_column_entries_are_sorted() {
        let m = sample();
        assert_eq!(m.row_entries(2), vec![(0, 4), (2, 5)]);
        assert_eq!(m.col_entries(1), vec![(0, 2), (1, 3)]);
        assert!(m.row_entries(1).iter().all(|&(c, _)| c == 1));
    }

    #[test]
    fn test_transpose_and_mul_vec() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.get(0, 2), 4);
        assert_eq!(t.get(2, 0), 0);
        assert_eq!(m.mul_vec(&[1, 2, 3]), vec![5, 6, 19]);
    }

    #[test]
    fn test_subtract_drops_cancelled_entries() {
        let m = sample();
        assert_eq!(m.zip_with(&m, |a, b| a - b).nnz(), 0);

        let mut other = DokMatrix::new(3, 3);
        other.add_entry(1, 2, 7);
        let sum = m.zip_with(&other, |a, b| a + b);
        assert_eq!(sum.nnz(), 6);
        assert_eq!(sum.get(1, 2), 7);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_entry_out_of_bounds() {
        DokMatrix::<i32>::new(2, 2).add_entry(2, 0, 1);
    }
}
