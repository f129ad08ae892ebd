//! Command line front end of the benchmarking harness.
//!
//! `bench` times operations across formats and writes the run document,
//! `run` executes one operation once, `stats` and `plot` report on saved
//! run documents, `formats` and `modes` list the accepted ids.
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use sparsebench::constants::DEFAULT_REPETITIONS;
use sparsebench::loader::{check_output_path, write_matrix_market};
use sparsebench::plot::{render_box_plots, LabeledRun};
use sparsebench::stats::{render_table, summarize, write_csv_file};
use sparsebench::{
    seeded_rng, BenchmarkRunner, FailurePolicy, FormatSelection, HarnessConfig,
    MatrixMarketLoader, Mode, OperandRequest, Operation, RunRequest, RunResult, StorageFormat,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "sparsebench",
    version,
    about = "Benchmarks sparse matrix storage formats on MatrixMarket inputs."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time one operation, or all of them, across storage formats
    Bench(BenchArgs),
    /// Execute a single operation once and optionally save its result
    Run(RunArgs),
    /// Summarise a run document as a table and optionally as CSV
    Stats(StatsArgs),
    /// Draw box plots of one or two run documents
    Plot(PlotArgs),
    /// List the storage format ids
    Formats,
    /// List the operation ids
    Modes,
}

/// Matrices and operands shared by `bench` and `run`.
#[derive(Args, Debug)]
struct OperandArgs {
    /// MatrixMarket file of the primary matrix.
    #[clap(long, value_name = "PATH")]
    path_a: PathBuf,

    /// MatrixMarket file of the second matrix, needed by add, sub and mmm.
    #[clap(long, value_name = "PATH")]
    path_b: Option<PathBuf>,

    /// Factor of the scalar multiplication.
    #[clap(long, allow_negative_numbers = true)]
    scalar: Option<f64>,

    /// Row or column used by spr, spc and mvm; drawn at random when absent.
    #[clap(long)]
    index: Option<usize>,

    /// Seed of the random index selection.
    #[clap(long)]
    seed: Option<u64>,

    /// JSON harness configuration.
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl OperandArgs {
    fn request(&self) -> OperandRequest {
        OperandRequest {
            secondary: self.path_b.clone(),
            scalar: self.scalar,
            index: self.index,
        }
    }

    /// The configuration file, or the defaults, with command line overrides
    fn harness_config(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Storage format id, or `all`.
    #[clap(long, value_name = "FORMAT")]
    format: FormatSelection,

    /// Operation id, or `full` for every operation.
    #[clap(long, value_name = "MODE")]
    mode: Mode,

    #[clap(flatten)]
    operands: OperandArgs,

    /// Timed executions per operation and format.
    #[clap(long, default_value_t = DEFAULT_REPETITIONS)]
    repetitions: usize,

    /// Where to write the run document; printed to stdout when absent.
    #[clap(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// In `full` mode, skip failing operations instead of aborting.
    #[clap(long)]
    continue_on_error: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Storage format id.
    #[clap(long, value_name = "FORMAT")]
    format: StorageFormat,

    /// Operation id.
    #[clap(long, value_name = "MODE")]
    mode: Operation,

    #[clap(flatten)]
    operands: OperandArgs,

    /// `.mtx` file receiving the result.
    #[clap(long, value_name = "PATH")]
    result_output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Run document written by `bench`.
    #[clap(long, value_name = "PATH")]
    input: PathBuf,

    /// CSV file receiving the statistics.
    #[clap(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Run document written by `bench`.
    #[clap(long, value_name = "PATH")]
    input: PathBuf,

    /// Label of the input document in the legend.
    #[clap(long)]
    label: Option<String>,

    /// Second run document drawn next to the first.
    #[clap(long, value_name = "PATH")]
    compare: Option<PathBuf>,

    /// Label of the second document.
    #[clap(long, requires = "compare")]
    compare_label: Option<String>,

    /// SVG file receiving the plots.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    match Cli::parse().command {
        Command::Bench(args) => bench(args),
        Command::Run(args) => run_once(args),
        Command::Stats(args) => stats(args),
        Command::Plot(args) => plot(args),
        Command::Formats => {
            for format in StorageFormat::ALL {
                println!("{:<6}{}", format.id(), format.description());
            }
            Ok(())
        }
        Command::Modes => {
            for op in Operation::ALL {
                println!("{:<6}{}", op.id(), op.description());
            }
            println!("{:<6}{}", Mode::FULL_ID, Mode::Full.description());
            Ok(())
        }
    }
}

fn bench(args: BenchArgs) -> Result<()> {
    let mut config = args.operands.harness_config()?;
    if args.continue_on_error {
        config.failure_policy = FailurePolicy::Continue;
    }

    let request = RunRequest {
        formats: args.format,
        mode: args.mode,
        primary: args.operands.path_a.clone(),
        operands: args.operands.request(),
        repetitions: args.repetitions,
    };

    let rng = seeded_rng(config.seed);
    let mut runner = BenchmarkRunner::new(config, MatrixMarketLoader, rng);
    let run = runner
        .run(&request)
        .with_context(|| format!("Benchmark of mode '{}' failed", args.mode))?;

    match &args.output {
        Some(path) => {
            run.write_to(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Run document written to {}", path.display());
            print!("{}", render_table(&summarize(&run)));
        }
        None => println!("{}", run.to_json_pretty()?),
    }
    Ok(())
}

fn run_once(args: RunArgs) -> Result<()> {
    // Fail on a bad destination before any work is done
    if let Some(path) = &args.result_output {
        check_output_path(path)?;
    }

    let config = args.operands.harness_config()?;
    let rng = seeded_rng(config.seed);
    let mut runner = BenchmarkRunner::new(config, MatrixMarketLoader, rng);
    let (output, elapsed) = runner
        .execute_once(
            args.format,
            args.mode,
            &args.operands.path_a,
            &args.operands.request(),
        )
        .with_context(|| format!("Running '{}' on {} failed", args.mode, args.format))?;

    println!("{} on {}: {:.6} s", args.mode, args.format, elapsed);
    println!("{}", output.summary());

    if let Some(path) = &args.result_output {
        write_matrix_market(path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn stats(args: StatsArgs) -> Result<()> {
    let run = RunResult::read_from(&args.input)
        .with_context(|| format!("Failed to read run document {}", args.input.display()))?;
    let rows = summarize(&run);
    print!("{}", render_table(&rows));

    if let Some(path) = &args.output {
        write_csv_file(&rows, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Statistics written to {}", path.display());
    }
    Ok(())
}

fn plot(args: PlotArgs) -> Result<()> {
    let primary = RunResult::read_from(&args.input)
        .with_context(|| format!("Failed to read run document {}", args.input.display()))?;
    let compare = match &args.compare {
        Some(path) => Some(
            RunResult::read_from(path)
                .with_context(|| format!("Failed to read run document {}", path.display()))?,
        ),
        None => None,
    };

    let mut runs = vec![LabeledRun {
        label: args.label.as_deref(),
        run: &primary,
    }];
    if let Some(other) = &compare {
        runs.push(LabeledRun {
            label: args.compare_label.as_deref(),
            run: other,
        });
    }

    std::fs::write(&args.output, render_box_plots(&runs))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Box plots written to {}", args.output.display());
    Ok(())
}
