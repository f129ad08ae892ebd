//! List of Lists (LIL) storage format implementation

use num_traits::Num;
use std::fmt;

/// A sparse matrix stored as one sorted list per row
///
/// - rows: For every row, the sorted column indices of its non-zeros
/// - data: For every row, the values matching `rows`
///
/// Cheap row access and incremental construction; column access needs a
/// search in every row.
#[derive(Clone, PartialEq)]
pub struct LilMatrix<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Column indices per row (size: n_rows)
    pub rows: Vec<Vec<usize>>,

    /// Values per row (size: n_rows)
    pub data: Vec<Vec<T>>,
}

impl<T> LilMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a new LIL matrix
    ///
    /// # Panics
    ///
    /// Panics if the row lists are inconsistent or a row is not sorted.
    pub fn new(n_rows: usize, n_cols: usize, rows: Vec<Vec<usize>>, data: Vec<Vec<T>>) -> Self {
        assert_eq!(rows.len(), n_rows, "rows.len() must be n_rows");
        assert_eq!(data.len(), n_rows, "data.len() must be n_rows");
        for (cols, vals) in rows.iter().zip(&data) {
            assert_eq!(cols.len(), vals.len(), "row lists must have equal lengths");
            assert!(
                cols.windows(2).all(|w| w[0] < w[1]),
                "column indices must be strictly increasing within a row"
            );
            if let Some(&last) = cols.last() {
                assert!(last < n_cols, "Column index {} out of bounds", last);
            }
        }

        Self {
            n_rows,
            n_cols,
            rows,
            data,
        }
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: vec![Vec::new(); n_rows],
            data: vec![Vec::new(); n_rows],
        }
    }

    /// Returns the number of stored values
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Iterator over the stored entries of row i
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        assert!(i < self.n_rows, "Row index out of bounds");
        self.rows[i].iter().copied().zip(self.data[i].iter().copied())
    }

    /// Non-zero entries of column j as sorted (row, value) pairs
    pub fn col_entries(&self, j: usize) -> Vec<(usize, T)> {
        assert!(j < self.n_cols, "Column index out of bounds");

        self.rows
            .iter()
            .zip(&self.data)
            .enumerate()
            .filter_map(|(i, (cols, vals))| {
                cols.binary_search(&j).ok().map(|pos| (i, vals[pos]))
            })
            .collect()
    }

    /// Computes y = A * x
    pub fn mul_vec(&self, x: &[T]) -> Vec<T> {
        assert_eq!(x.len(), self.n_cols, "x.len() must equal n_cols");

        self.rows
            .iter()
            .zip(&self.data)
            .map(|(cols, vals)| {
                cols.iter()
                    .zip(vals)
                    .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j])
            })
            .collect()
    }

    /// Multiplies every stored value by `factor`
    pub fn scale(&self, factor: T) -> Self {
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            rows: self.rows.clone(),
            data: self
                .data
                .iter()
                .map(|vals| vals.iter().map(|&v| v * factor).collect())
                .collect(),
        }
    }

    /// Returns the transpose
    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.n_cols, self.n_rows);

        // Rows are visited in order, so every new row list stays sorted
        for (i, (cols, vals)) in self.rows.iter().zip(&self.data).enumerate() {
            for (&j, &v) in cols.iter().zip(vals) {
                result.rows[j].push(i);
                result.data[j].push(v);
            }
        }
        result
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

        let mut result = Self::zeros(self.n_rows, self.n_cols);
        for i in 0..self.n_rows {
            let (a_cols, a_vals) = (&self.rows[i], &self.data[i]);
            let (b_cols, b_vals) = (&other.rows[i], &other.data[i]);
            let out_cols = &mut result.rows[i];
            let out_vals = &mut result.data[i];

            let (mut p, mut q) = (0, 0);
            while p < a_cols.len() || q < b_cols.len() {
                let (col, val) = if q == b_cols.len()
                    || (p < a_cols.len() && a_cols[p] < b_cols[q])
                {
                    p += 1;
                    (a_cols[p - 1], op(a_vals[p - 1], T::zero()))
                } else if p == a_cols.len() || b_cols[q] < a_cols[p] {
                    q += 1;
                    (b_cols[q - 1], op(T::zero(), b_vals[q - 1]))
                } else {
                    p += 1;
                    q += 1;
                    (a_cols[p - 1], op(a_vals[p - 1], b_vals[q - 1]))
                };

                if !val.is_zero() {
                    out_cols.push(col);
                    out_vals.push(val);
                }
            }
        }
        result
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for LilMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LilMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_rows_to_print = 5.min(self.n_rows);
        for i in 0..max_rows_to_print {
            if self.rows[i].is_empty() {
                writeln!(f, "    row {}: (empty)", i)?;
            } else {
                let shown: Vec<_> = self.row_iter(i).take(5).collect();
                writeln!(f, "    row {}: {:?}", i, shown)?;
            }
        }
        if self.n_rows > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
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
    fn sample() -> LilMatrix<i32> {
        LilMatrix::new(
            3,
            3,
            vec![vec![0, 1], vec![1], vec![0, 2]],
            vec![vec![1, 2], vec![3], vec![4, 5]],
        )
    }

    #[test]
    fn test_row_iter_and_col_entries() {
        let m = sample();
        assert_eq!(m.nnz(), 5);
        assert_eq!(m.row_iter(2).collect::<Vec<_>>(), vec![(0, 4), (2, 5)]);
        assert_eq!(m.col_entries(0), vec![(0, 1), (2, 4)]);
        assert_eq!(m.col_entries(2), vec![(2, 5)]);
    }

    #[test]
    fn test_transpose() {
        let t = sample().transpose();
        assert_eq!(t.rows, vec![vec![0, 2], vec![0, 1], vec![2]]);
        assert_eq!(t.data, vec![vec![1, 4], vec![2, 3], vec![5]]);
    }

    #[test]
    fn test_add_and_subtract() {
        let a = sample();
        let b = LilMatrix::new(
            3,
            3,
            vec![vec![1, 2], vec![], vec![0]],
            vec![vec![1, 7], vec![], vec![-4]],
        );

        let sum = a.zip_with(&b, |x, y| x + y);
        assert_eq!(sum.rows, vec![vec![0, 1, 2], vec![1], vec![2]]);
        assert_eq!(sum.data, vec![vec![1, 3, 7], vec![3], vec![5]]);

        let diff = a.zip_with(&a, |x, y| x - y);
        assert_eq!(diff.nnz(), 0);
    }

    #[test]
    fn test_mul_vec() {
        assert_eq!(sample().mul_vec(&[1, 2, 3]), vec![5, 6, 19]);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn test_unsorted_row() {
        LilMatrix::new(1, 3, vec![vec![2, 0]], vec![vec![1, 1]]);
    }
}
