use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use copynum_core::analysis::{run_analysis_reported, AnalysisHooks};
use copynum_core::consts::{HISTOGRAM_FILE_NAME, STATS_FILE_NAME};
use copynum_core::diagnostics::TracingDiagnostics;
use copynum_core::io::{load_masks, load_stacks};
use copynum_core::stats::{compute_stats, copy_number_histogram, write_histogram, write_stats};

use crate::progress::SpinnerReporter;
use crate::summary::{print_pipeline_summary, print_results, print_stats};

use super::load_config;
use super::metadata::save_run_metadata;
use super::profiles::ProfileCsvWriter;

const PROFILES_FILE_NAME: &str = "intensity_profiles.csv";

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the relative intensity drop (percent) for active slices
    #[arg(long)]
    pub drop_threshold: Option<f64>,

    /// Write per-cell intensity profiles
    #[arg(long)]
    pub profiles: bool,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip writing run metadata
    #[arg(long)]
    pub no_metadata: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(drop) = args.drop_threshold {
        config.analysis.active_slices.drop_threshold = drop;
    }
    if args.profiles {
        config.analysis.active_slices.plot_intensity_profile = true;
    }
    if let Some(ref dir) = args.output {
        config.analysis.output.dir = dir.clone();
    }
    config.validate().context("Invalid pipeline config")?;

    print_pipeline_summary(&config);

    let output_dir = config.analysis.output.dir.clone();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let stacks = load_stacks(&config.paths)?;
    if stacks.is_empty() {
        bail!("No image stacks were loaded from {}", config.paths.gfp_dir.display());
    }
    let masks = load_masks(&config.paths)?;
    if masks.is_empty() {
        bail!("No segmentation masks were loaded from {}", config.paths.mask_dir.display());
    }
    tracing::info!(stacks = stacks.len(), masks = masks.len(), "Inputs loaded");

    let diagnostics = TracingDiagnostics;
    let reporter = SpinnerReporter::new();
    let mut profile_writer = if config.analysis.active_slices.plot_intensity_profile {
        Some(ProfileCsvWriter::create(&output_dir.join(PROFILES_FILE_NAME))?)
    } else {
        None
    };

    let mut hooks = AnalysisHooks::new(&diagnostics, &reporter);
    if let Some(ref mut writer) = profile_writer {
        hooks = hooks.with_profile_observer(writer);
    }
    let rows = run_analysis_reported(&stacks, &masks, &config.analysis, hooks)?;

    if let Some(writer) = profile_writer {
        writer.finish()?;
    }

    print_results(&rows, &config.analysis.output.path());

    let copy_numbers: Vec<f64> = rows.iter().filter_map(|r| r.copy_number).collect();
    if config.report.stats_summary {
        if let Some(stats) = compute_stats(&copy_numbers) {
            write_stats(&output_dir.join(STATS_FILE_NAME), &stats)?;
            print_stats(&stats);
        }
        let bins = copy_number_histogram(&copy_numbers, config.report.histogram_bins);
        if !bins.is_empty() {
            write_histogram(&output_dir.join(HISTOGRAM_FILE_NAME), &bins)?;
        }
    }

    if !args.no_metadata {
        let path = save_run_metadata(&config, &output_dir)?;
        println!("Metadata saved to {}", path.display());
    }

    Ok(())
}
