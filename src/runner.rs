//! Benchmark orchestration
//!
//! The runner validates a request, loads its matrices, resolves every operand
//! once and then times each selected operation on each selected format. All
//! operand problems are reported before the first timing starts.

use crate::config::{FailurePolicy, HarnessConfig};
use crate::error::{BenchError, Result};
use crate::loader::MatrixLoader;
use crate::matrix::{SparseMatrix, StorageFormat};
use crate::registry::{Axis, Mode, OpOutput, OperandRule, Operands, Operation};
use crate::results::{BenchmarkResult, FormatResult, RunResult};
use crate::timer::{time_once, time_repeated};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::str::FromStr;

/// Which formats a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSelection {
    Single(StorageFormat),
    /// Every format listed in the configuration
    All,
}

impl FromStr for FormatSelection {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(FormatSelection::All)
        } else {
            s.parse().map(FormatSelection::Single)
        }
    }
}

/// Optional operands supplied by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperandRequest {
    /// Second matrix for `add`, `sub` and `mmm`
    pub secondary: Option<PathBuf>,
    /// Factor for `sm`
    pub scalar: Option<f64>,
    /// Row or column for `spr`, `spc` and `mvm`; drawn at random when absent
    pub index: Option<usize>,
}

/// A complete benchmark request
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub formats: FormatSelection,
    pub mode: Mode,
    pub primary: PathBuf,
    pub operands: OperandRequest,
    pub repetitions: usize,
}

/// Row and column index shared by every operation of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedIndices {
    pub row: Option<usize>,
    pub col: Option<usize>,
}

/// Drives the timer over formats and operations
pub struct BenchmarkRunner<L, R> {
    config: HarnessConfig,
    loader: L,
    rng: R,
}

/// Index RNG seeded from `seed`, or from system entropy when there is none
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Checks that every operand `mode` needs was supplied
pub fn validate_operands(mode: Mode, operands: &OperandRequest) -> Result<()> {
    for operation in mode.operations() {
        match operation.operand_rule() {
            OperandRule::Binary if operands.secondary.is_none() => {
                return Err(BenchError::MissingOperand {
                    operand: "--path-b",
                    operation: mode.id(),
                });
            }
            OperandRule::Scalar if operands.scalar.is_none() => {
                return Err(BenchError::MissingOperand {
                    operand: "--scalar",
                    operation: mode.id(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

impl<L, R> BenchmarkRunner<L, R>
where
    L: MatrixLoader,
    R: Rng,
{
    pub fn new(config: HarnessConfig, loader: L, rng: R) -> Self {
        Self {
            config,
            loader,
            rng,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn selected_formats(&self, selection: FormatSelection) -> Vec<StorageFormat> {
        match selection {
            FormatSelection::Single(format) => vec![format],
            FormatSelection::All => self.config.formats.clone(),
        }
    }

    /// Runs a request and returns the complete result document
    ///
    /// Under the default failure policy any error aborts the run and nothing
    /// is returned.
    pub fn run(&mut self, request: &RunRequest) -> Result<RunResult> {
        if request.repetitions < 1 {
            return Err(BenchError::InvalidRepetitionCount(request.repetitions));
        }
        validate_operands(request.mode, &request.operands)?;

        let operations = request.mode.operations();
        let needs_secondary = operations
            .iter()
            .any(|op| op.operand_rule() == OperandRule::Binary);

        let primary = self.loader.read_triplets(&request.primary)?;
        let secondary = match (&request.operands.secondary, needs_secondary) {
            (Some(path), true) => Some(self.loader.read_triplets(path)?),
            _ => None,
        };

        let indices = self.resolve_indices(
            request.mode,
            (primary.rows(), primary.cols()),
            request.operands.index,
        )?;

        let mut run = RunResult::default();
        for format in self.selected_formats(request.formats) {
            let a = SparseMatrix::from_triplets(&primary, format, self.config.bsr_block);
            let b = secondary
                .as_ref()
                .map(|tri| SparseMatrix::from_triplets(tri, format, self.config.bsr_block));

            let operands = ResolvedOperands {
                secondary: b.as_ref(),
                scalar: request.operands.scalar,
                indices,
            };
            run.data.push(self.benchmark_format(
                request.mode,
                &a,
                &operands,
                request.repetitions,
            )?);
        }
        Ok(run)
    }

    /// Draws or validates the indices the operations of `mode` need
    ///
    /// An explicit index must be valid on every axis it is used for.
    pub fn resolve_indices(
        &mut self,
        mode: Mode,
        (rows, cols): (usize, usize),
        explicit: Option<usize>,
    ) -> Result<ResolvedIndices> {
        let mut indices = ResolvedIndices::default();
        for operation in mode.operations() {
            let (slot, bound, axis) = match operation.index_axis() {
                Some(Axis::Row) => (&mut indices.row, rows, "row"),
                Some(Axis::Column) => (&mut indices.col, cols, "column"),
                None => continue,
            };
            if slot.is_some() {
                continue;
            }
            if bound == 0 {
                return Err(BenchError::EmptyDimension {
                    axis,
                    operation: mode.id(),
                });
            }

            let index = match explicit {
                Some(index) => index,
                None => self.rng.gen_range(0..bound),
            };
            if index >= bound {
                return Err(BenchError::IndexOutOfRange {
                    index,
                    bound,
                    operation: mode.id(),
                });
            }
            *slot = Some(index);
        }
        debug!("Resolved indices: {:?}", indices);
        Ok(indices)
    }

    /// Times every operation of `mode` on one loaded matrix
    pub fn benchmark_format(
        &self,
        mode: Mode,
        primary: &SparseMatrix,
        operands: &ResolvedOperands<'_>,
        repetitions: usize,
    ) -> Result<FormatResult> {
        let format = primary.format();
        let mut results = Vec::new();

        // Resolve all operands up front so nothing fails once timing has started
        let mut prepared = Vec::new();
        for operation in mode.operations() {
            prepared.push((operation, operands.prepare(operation, mode, primary)?));
        }

        for (operation, args) in &prepared {
            info!(
                "Benchmarking {} on {} ({} repetitions)",
                operation, format, repetitions
            );
            let timed = time_repeated(repetitions, || {
                operation
                    .apply(args)
                    .map_err(|e| BenchError::execution(format.id(), operation.id(), e))
            });

            match timed {
                Ok(time) => {
                    debug!(
                        "{} on {}: mean {:.6} s",
                        operation,
                        format,
                        time.iter().sum::<f64>() / time.len() as f64
                    );
                    results.push(BenchmarkResult {
                        mode: *operation,
                        time,
                    });
                }
                Err(e)
                    if mode == Mode::Full
                        && self.config.failure_policy == FailurePolicy::Continue =>
                {
                    warn!("Skipping {} on {}: {}", operation, format, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(FormatResult { format, results })
    }

    /// Loads the inputs and runs `operation` a single time
    ///
    /// Returns the result of the operation and its elapsed seconds.
    pub fn execute_once(
        &mut self,
        format: StorageFormat,
        operation: Operation,
        primary: &std::path::Path,
        request: &OperandRequest,
    ) -> Result<(OpOutput, f64)> {
        let mode = Mode::Single(operation);
        validate_operands(mode, request)?;

        let bsr_block = self.config.bsr_block;
        let a = self.loader.load(primary, format, bsr_block)?;
        let b = match (&request.secondary, operation.operand_rule()) {
            (Some(path), OperandRule::Binary) => Some(self.loader.load(path, format, bsr_block)?),
            _ => None,
        };
        let indices = self.resolve_indices(mode, a.shape(), request.index)?;

        let operands = ResolvedOperands {
            secondary: b.as_ref(),
            scalar: request.scalar,
            indices,
        };
        let args = operands.prepare(operation, mode, &a)?;

        let (output, elapsed) = time_once(|| {
            operation
                .apply(&args)
                .map_err(|e| BenchError::execution(format.id(), operation.id(), e))
        })?;
        info!("{} on {} took {:.6} s", operation, format, elapsed);
        Ok((output, elapsed))
    }
}

/// Operands resolved once and shared by every operation of a run
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOperands<'a> {
    pub secondary: Option<&'a SparseMatrix>,
    pub scalar: Option<f64>,
    pub indices: ResolvedIndices,
}

impl<'a> ResolvedOperands<'a> {
    /// Binds the operands of `operation` to `primary`
    ///
    /// The matrix-vector operand is spliced here, before any timing.
    pub fn prepare(
        &self,
        operation: Operation,
        mode: Mode,
        primary: &'a SparseMatrix,
    ) -> Result<Operands<'a>> {
        let missing_index = || BenchError::IndexOutOfRange {
            index: 0,
            bound: 0,
            operation: mode.id(),
        };
        let in_context = |e| BenchError::execution(primary.format().id(), operation.id(), e);

        Ok(match operation.operand_rule() {
            OperandRule::Unary => Operands::Unary(primary),
            OperandRule::Indexed(Axis::Row) => {
                Operands::Indexed(primary, self.indices.row.ok_or_else(missing_index)?)
            }
            OperandRule::Indexed(Axis::Column) => {
                Operands::Indexed(primary, self.indices.col.ok_or_else(missing_index)?)
            }
            OperandRule::Binary => {
                let secondary = self.secondary.ok_or(BenchError::MissingOperand {
                    operand: "--path-b",
                    operation: mode.id(),
                })?;
                Operands::Binary(primary, secondary)
            }
            OperandRule::Scalar => {
                let scalar = self.scalar.ok_or(BenchError::MissingOperand {
                    operand: "--scalar",
                    operation: mode.id(),
                })?;
                Operands::Scalar(scalar, primary)
            }
            OperandRule::MatrixVector => {
                let row = self.indices.row.ok_or_else(missing_index)?;
                let vector = primary.row(row).map_err(in_context)?.to_dense();
                Operands::MatrixVector(primary, vector)
            }
        })
    }
}
