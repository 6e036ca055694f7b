use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use copynum_core::consts::{DEFAULT_HISTOGRAM_BINS, HISTOGRAM_FILE_NAME, STATS_FILE_NAME};
use copynum_core::report::read_copy_numbers;
use copynum_core::stats::{compute_stats, copy_number_histogram, write_histogram, write_stats};

use crate::summary::print_stats;

#[derive(Args)]
pub struct SummarizeArgs {
    /// Per-cell table written by `copynum run`
    pub table: PathBuf,

    /// Number of histogram bins
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,

    /// Directory for the statistics and histogram files (defaults to the table's directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &SummarizeArgs) -> Result<()> {
    if !args.table.exists() {
        bail!(
            "Processed data file not found at {}. Run the full pipeline first.",
            args.table.display()
        );
    }

    let copy_numbers = read_copy_numbers(&args.table)
        .with_context(|| format!("Failed to read {}", args.table.display()))?
        .context("'Copy Number' column not found in processed data")?;
    let Some(stats) = compute_stats(&copy_numbers) else {
        bail!("No copy number data found in {}", args.table.display());
    };

    let output_dir = match args.output {
        Some(ref dir) => dir.clone(),
        None => args
            .table
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&output_dir)?;

    write_stats(&output_dir.join(STATS_FILE_NAME), &stats)?;
    let bins = copy_number_histogram(&copy_numbers, args.bins);
    write_histogram(&output_dir.join(HISTOGRAM_FILE_NAME), &bins)?;

    print_stats(&stats);
    println!("Summaries saved to {}", output_dir.display());
    Ok(())
}
