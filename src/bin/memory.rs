//! Reports how many bytes one MatrixMarket input takes in each storage format.
//!
//! Every format of the harness configuration is built from the same triplets,
//! so the peak RSS printed last covers all of them at once.
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use sparsebench::{HarnessConfig, MatrixLoader, MatrixMarketLoader, MemoryReport};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "memory",
    about = "Prints the memory footprint of a sparse matrix in every storage format."
)]
struct MemoryArgs {
    /// MatrixMarket file to measure.
    #[clap(long, value_name = "PATH")]
    input: PathBuf,

    /// JSON harness configuration selecting the formats and BSR block size.
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[clap(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = MemoryArgs::parse();
    let config = match &args.config {
        Some(path) => HarnessConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    let triplets = MatrixMarketLoader
        .read_triplets(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let report = MemoryReport::measure(&triplets, &config.formats, config.bsr_block);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
