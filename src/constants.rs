//! Centralized constants for the benchmarking harness
//!
//! All hardcoded numbers used by the runner, the reporters and the plot
//! renderers live here rather than being scattered throughout the code.

// ============================================================================
// BENCHMARK DEFAULTS
// ============================================================================

/// Repetitions used when the caller does not ask for a specific count
pub const DEFAULT_REPETITIONS: usize = 10;

/// Preferred block height and width for BSR storage
pub const DEFAULT_BSR_BLOCK: usize = 2;

/// Conversion factor applied to timings at report time
pub const MS_PER_SECOND: f64 = 1000.0;

/// Banner every MatrixMarket file must start with
pub const MATRIX_MARKET_BANNER: &str = "%%MatrixMarket";

// ============================================================================
// BOX PLOT LAYOUT
// ============================================================================

/// Total width of a box plot figure in pixels
pub const PLOT_WIDTH: f64 = 900.0;

/// Space reserved on the left for series labels
pub const PLOT_LABEL_WIDTH: f64 = 170.0;

/// Right margin of a box plot figure
pub const PLOT_RIGHT_MARGIN: f64 = 30.0;

/// Height of a single box (one format in one panel)
pub const PLOT_ROW_HEIGHT: f64 = 22.0;

/// Vertical space taken by a panel title and its axis
pub const PLOT_PANEL_HEADER: f64 = 40.0;

/// Space below the axis of each panel for tick labels
pub const PLOT_PANEL_FOOTER: f64 = 36.0;

// ============================================================================
// SPARSITY PATTERN LAYOUT
// ============================================================================

/// Side length of one sparsity pattern panel
pub const SPY_PANEL_SIZE: f64 = 320.0;

/// Gap between sparsity pattern panels
pub const SPY_PANEL_GAP: f64 = 40.0;

/// Number of panels per row in a sparsity pattern figure
pub const SPY_COLUMNS: usize = 2;

/// Marker size (in pixels) of one non-zero entry
pub const SPY_MARKER_SIZE: f64 = 0.6;
