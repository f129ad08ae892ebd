//! # sparsebench: benchmarking sparse matrix storage formats
//!
//! Times the basic operations of sparse linear algebra across seven storage
//! formats and reports the results as JSON, statistics tables and box plots.
//!
//! ## Overview
//!
//! - Storage formats: COO, CSR and CSC from `sprs`, plus DIA, BSR, LIL and DOK
//!   implemented in [`matrix`]
//! - Operations: row and column splicing, addition, subtraction, scalar
//!   multiplication, matrix-vector and matrix-matrix products, transposition
//! - Inputs are MatrixMarket coordinate files
//!
//! ## Components
//!
//! 1. **Loader** ([`loader`]): reads MatrixMarket files into a [`SparseMatrix`]
//!    of the requested format.
//!
//! 2. **Registry** ([`registry`]): the [`Operation`] descriptors and the
//!    composite [`Mode::Full`].
//!
//! 3. **Runner** ([`runner`]): resolves operands, then times each operation with
//!    [`timer::time_repeated`].
//!
//! 4. **Reporting** ([`results`], [`stats`], [`plot`], [`memory`]): the run
//!    document, summary statistics, SVG plots and memory footprints.
//!
//! ## Usage
//!
//! ```
//! use sparsebench::{Operation, SparseMatrix, StorageFormat};
//! use sparsebench::registry::{OpOutput, Operands};
//! use sprs::TriMat;
//!
//! let tri = TriMat::from_triplets((2, 2), vec![0, 1], vec![1, 0], vec![1.0, 2.0]);
//! let a = SparseMatrix::from_triplets(&tri, StorageFormat::Dia, 2);
//!
//! let out = Operation::Transpose.apply(&Operands::Unary(&a)).unwrap();
//! match out {
//!     OpOutput::Matrix(t) => assert_eq!(t.to_dense()[[0, 1]], 2.0),
//!     _ => unreachable!(),
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod memory;
pub mod plot;
pub mod registry;
pub mod results;
pub mod runner;
pub mod stats;
pub mod timer;
pub mod utils;

// Re-export primary components
pub use config::{FailurePolicy, HarnessConfig};
pub use error::{BenchError, MatrixError, Result};
pub use loader::{MatrixLoader, MatrixMarketLoader};
pub use matrix::{SparseMatrix, SparseStorage, StorageFormat};
pub use memory::MemoryReport;
pub use registry::{Mode, OpOutput, Operation};
pub use results::{BenchmarkResult, FormatResult, RunResult};
pub use runner::{seeded_rng, BenchmarkRunner, FormatSelection, OperandRequest, RunRequest};
pub use stats::{StatsRow, Summary};

/// Version of the harness
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
