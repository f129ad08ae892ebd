//! Draws the sparsity patterns of several MatrixMarket files side by side.
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use sparsebench::plot::render_sparsity_patterns;
use sparsebench::{MatrixLoader, MatrixMarketLoader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "spy",
    about = "Renders the non-zero pattern of each input matrix into one SVG."
)]
struct SpyArgs {
    /// MatrixMarket files to draw; repeat the option for each file.
    #[clap(long = "file", value_name = "PATH", required = true)]
    files: Vec<PathBuf>,

    /// SVG file receiving the figure.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let mut args = SpyArgs::parse();
    args.files
        .sort_by_key(|path| path.to_string_lossy().to_lowercase());

    let mut matrices = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let triplets = MatrixMarketLoader
            .read_triplets(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        matrices.push((stem, triplets));
    }

    let panels: Vec<(String, &_)> = matrices
        .iter()
        .map(|(stem, triplets)| (stem.clone(), triplets))
        .collect();
    std::fs::write(&args.output, render_sparsity_patterns(&panels))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(
        "Sparsity patterns of {} matrices written to {}",
        panels.len(),
        args.output.display()
    );
    Ok(())
}
