//! MatrixMarket input and output
//!
//! Input files must be MatrixMarket coordinate files with a real, integer or
//! pattern field. Parsing is delegated to the `sprs` codec; this module reads
//! the header first so that other files are rejected with a clear message
//! instead of a parse error, and integer and pattern values become `f64`.

use crate::constants::MATRIX_MARKET_BANNER;
use crate::error::{BenchError, Result};
use crate::matrix::{SparseMatrix, StorageFormat};
use crate::registry::OpOutput;
use log::{debug, info};
use sprs::num_kinds::Pattern;
use sprs::{CsMat, TriMat};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Source of input matrices
///
/// The runner only needs triplets; the storage format is materialised from
/// them. Implement this to feed matrices from somewhere other than disk.
pub trait MatrixLoader {
    /// Reads the triplets stored under `path`
    fn read_triplets(&self, path: &Path) -> Result<TriMat<f64>>;

    /// Reads `path` and stores the matrix in `format`
    fn load(&self, path: &Path, format: StorageFormat, bsr_block: usize) -> Result<SparseMatrix> {
        let triplets = self.read_triplets(path)?;
        Ok(SparseMatrix::from_triplets(&triplets, format, bsr_block))
    }
}

/// Loads MatrixMarket coordinate files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixMarketLoader;

impl MatrixLoader for MatrixMarketLoader {
    fn read_triplets(&self, path: &Path) -> Result<TriMat<f64>> {
        let field = read_header(path)?;
        let parse_error = |e: sprs::io::IoError| {
            BenchError::InvalidInputFormat(format!("cannot parse {}: {}", path.display(), e))
        };

        let triplets = match field {
            ValueField::Real => sprs::io::read_matrix_market::<f64, usize, _>(path)
                .map_err(parse_error)?,
            ValueField::Integer => {
                let integers = sprs::io::read_matrix_market::<i64, usize, _>(path)
                    .map_err(parse_error)?;
                map_values(&integers, |&v| v as f64)
            }
            ValueField::Pattern => {
                let pattern = sprs::io::read_matrix_market::<Pattern, usize, _>(path)
                    .map_err(parse_error)?;
                map_values(&pattern, |_| 1.0)
            }
        };

        info!(
            "Loaded {} ({:?}): {} x {} with {} entries",
            path.display(),
            field,
            triplets.rows(),
            triplets.cols(),
            triplets.nnz()
        );
        Ok(triplets)
    }
}

/// Value type declared in a MatrixMarket coordinate banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueField {
    Real,
    Integer,
    /// Positions only; every entry reads as one
    Pattern,
}

/// Checks that `path` starts like a MatrixMarket coordinate file
///
/// The banner must name a real, integer or pattern field and be followed by
/// a size line, possibly after comments.
pub fn read_header(path: &Path) -> Result<ValueField> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let banner = match lines.next() {
        Some(line) => line?,
        None => String::new(),
    };
    debug!("Header of {}: {}", path.display(), banner.trim_end());

    let tokens: Vec<String> = banner
        .split_whitespace()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    let is_coordinate = tokens.len() >= 4
        && tokens[0] == MATRIX_MARKET_BANNER.to_ascii_lowercase()
        && tokens[1] == "matrix"
        && tokens[2] == "coordinate";
    if !is_coordinate {
        return Err(BenchError::InvalidInputFormat(format!(
            "{} is not a MatrixMarket coordinate file",
            path.display()
        )));
    }

    let field = match tokens[3].as_str() {
        "real" => ValueField::Real,
        "integer" => ValueField::Integer,
        "pattern" => ValueField::Pattern,
        other => {
            return Err(BenchError::InvalidInputFormat(format!(
                "{}: unsupported value field '{}'",
                path.display(),
                other
            )))
        }
    };

    for line in lines {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('%') {
            return Ok(field);
        }
    }
    Err(BenchError::InvalidInputFormat(format!(
        "{} has no size line",
        path.display()
    )))
}

/// Rebuilds triplets with every value passed through `f`
fn map_values<N, F>(triplets: &TriMat<N>, f: F) -> TriMat<f64>
where
    F: Fn(&N) -> f64,
{
    TriMat::from_triplets(
        (triplets.rows(), triplets.cols()),
        triplets.row_inds().to_vec(),
        triplets.col_inds().to_vec(),
        triplets.data().iter().map(f).collect(),
    )
}

/// Rejects result paths that do not end in `.mtx`
pub fn check_output_path(path: &Path) -> Result<()> {
    if path.extension().map_or(true, |ext| ext != "mtx") {
        return Err(BenchError::InvalidOutputPath(path.to_path_buf()));
    }
    Ok(())
}

/// Writes the result of an operation to a `.mtx` file
///
/// Vectors are written as single-column matrices.
pub fn write_matrix_market(path: &Path, output: &OpOutput) -> Result<()> {
    check_output_path(path)?;

    match output {
        OpOutput::Matrix(matrix) => sprs::io::write_matrix_market(path, &matrix.to_csr())?,
        OpOutput::SparseVector(vector) => {
            let mut column = TriMat::with_capacity((vector.dim(), 1), vector.nnz());
            for (i, &v) in vector.iter() {
                column.add_triplet(i, 0, v);
            }
            let column: CsMat<f64> = column.to_csr();
            sprs::io::write_matrix_market(path, &column)?
        }
        OpOutput::DenseVector(vector) => {
            let mut column = TriMat::with_capacity((vector.len(), 1), vector.len());
            for (i, &v) in vector.iter().enumerate() {
                if v != 0.0 {
                    column.add_triplet(i, 0, v);
                }
            }
            let column: CsMat<f64> = column.to_csr();
            sprs::io::write_matrix_market(path, &column)?
        }
    }

    info!("Result written to {}", path.display());
    Ok(())
}
