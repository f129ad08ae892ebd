//! Binary matrix operations: addition, subtraction and multiplication
//!
//! Both operands must be held in the same storage format. CSR and CSC use the
//! sprs kernels, LIL and DOK merge natively, and the remaining formats go
//! through CSR and return a CSR result.

use super::SparseMatrix;
use crate::error::MatrixError;
use sprs::CsMat;

impl SparseMatrix {
    fn check_same_format(&self, other: &SparseMatrix) -> Result<(), MatrixError> {
        if self.format() != other.format() {
            return Err(MatrixError::FormatMismatch {
                left: self.format().id(),
                right: other.format().id(),
            });
        }
        Ok(())
    }

    fn check_same_shape(&self, other: &SparseMatrix) -> Result<(), MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    /// Element-wise sum `A + B`
    pub fn add(&self, other: &SparseMatrix) -> Result<SparseMatrix, MatrixError> {
        self.check_same_format(other)?;
        self.check_same_shape(other)?;

        Ok(match (self, other) {
            (SparseMatrix::Csr(a), SparseMatrix::Csr(b))
            | (SparseMatrix::Csc(a), SparseMatrix::Csc(b)) => SparseMatrix::from_compressed(a + b),
            (SparseMatrix::Lil(a), SparseMatrix::Lil(b)) => {
                SparseMatrix::Lil(a.zip_with(b, |x, y| x + y))
            }
            (SparseMatrix::Dok(a), SparseMatrix::Dok(b)) => {
                SparseMatrix::Dok(a.zip_with(b, |x, y| x + y))
            }
            _ => SparseMatrix::Csr(&self.to_csr() + &other.to_csr()),
        })
    }

    /// Element-wise difference `A - B`
    pub fn sub(&self, other: &SparseMatrix) -> Result<SparseMatrix, MatrixError> {
        self.check_same_format(other)?;
        self.check_same_shape(other)?;

        Ok(match (self, other) {
            (SparseMatrix::Csr(a), SparseMatrix::Csr(b))
            | (SparseMatrix::Csc(a), SparseMatrix::Csc(b)) => SparseMatrix::from_compressed(a - b),
            (SparseMatrix::Lil(a), SparseMatrix::Lil(b)) => {
                SparseMatrix::Lil(a.zip_with(b, |x, y| x - y))
            }
            (SparseMatrix::Dok(a), SparseMatrix::Dok(b)) => {
                SparseMatrix::Dok(a.zip_with(b, |x, y| x - y))
            }
            _ => SparseMatrix::Csr(&self.to_csr() - &other.to_csr()),
        })
    }

    /// Matrix product `A * B`
    pub fn mul_mat(&self, other: &SparseMatrix) -> Result<SparseMatrix, MatrixError> {
        self.check_same_format(other)?;
        if self.cols() != other.rows() {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }

        Ok(match (self, other) {
            (SparseMatrix::Csr(a), SparseMatrix::Csr(b))
            | (SparseMatrix::Csc(a), SparseMatrix::Csc(b)) => SparseMatrix::from_compressed(a * b),
            _ => {
                let product: CsMat<f64> = &self.to_csr() * &other.to_csr();
                SparseMatrix::Csr(product)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::StorageFormat;
    use ndarray::arr2;
    use sprs::TriMat;

    fn build(format: StorageFormat, dense: &[[f64; 3]; 3]) -> SparseMatrix {
        let mut tri = TriMat::new((3, 3));
        for (i, row) in dense.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    tri.add_triplet(i, j, v);
                }
            }
        }
        SparseMatrix::from_triplets(&tri, format, 1)
    }

    // Formats whose add, sub and product come back in the same format
    fn keeps_format(format: StorageFormat) -> bool {
        matches!(
            format,
            StorageFormat::Csr | StorageFormat::Csc | StorageFormat::Lil | StorageFormat::Dok
        )
    }

    const A: [[f64; 3]; 3] = [[1.0, 0.0, 2.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]];
    const B: [[f64; 3]; 3] = [[0.0, 1.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]];

    #[test]
    fn test_add_sub_mul_agree_across_formats() {
        let sum = arr2(&[[1.0, 1.0, 2.0], [2.0, 3.0, 0.0], [4.0, 0.0, 6.0]]);
        let diff = arr2(&[[1.0, -1.0, 2.0], [-2.0, 3.0, 0.0], [4.0, 0.0, 4.0]]);
        let product = arr2(&[[0.0, 1.0, 2.0], [6.0, 0.0, 0.0], [0.0, 4.0, 5.0]]);

        for format in StorageFormat::ALL {
            let a = build(format, &A);
            let b = build(format, &B);
            assert_eq!(a.add(&b).unwrap().to_dense(), sum, "add for {}", format);
            assert_eq!(a.sub(&b).unwrap().to_dense(), diff, "sub for {}", format);
            assert_eq!(a.mul_mat(&b).unwrap().to_dense(), product, "mmm for {}", format);
        }
    }

    #[test]
    fn test_result_format() {
        for format in StorageFormat::ALL {
            let a = build(format, &A);
            let result = a.add(&a).unwrap().format();
            if keeps_format(format) {
                assert_eq!(result, format);
            } else {
                assert_eq!(result, StorageFormat::Csr);
            }
        }
    }

    #[test]
    fn test_mismatches_are_reported() {
        let a = build(StorageFormat::Csr, &A);
        let b = build(StorageFormat::Csc, &B);
        assert_eq!(
            a.add(&b).unwrap_err(),
            MatrixError::FormatMismatch {
                left: "csr",
                right: "csc"
            }
        );

        let tall = SparseMatrix::from_triplets(
            &TriMat::from_triplets((2, 3), vec![0], vec![0], vec![1.0]),
            StorageFormat::Csr,
            1,
        );
        assert!(matches!(
            a.sub(&tall),
            Err(MatrixError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            a.mul_mat(&tall),
            Err(MatrixError::DimensionMismatch { .. })
        ));
    }
}
