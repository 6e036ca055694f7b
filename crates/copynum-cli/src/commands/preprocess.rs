use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use copynum_core::preprocess::preprocess_directory;

use super::load_config;

#[derive(Args)]
pub struct PreprocessArgs {
    /// Pipeline config file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

pub fn run(args: &PreprocessArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let paths = &config.paths;

    println!("Splitting raw stacks from {}", paths.input_dir.display());
    let processed = preprocess_directory(paths)?;
    if processed == 0 {
        bail!("No raw stacks were processed in {}", paths.input_dir.display());
    }

    println!("Processed {processed} file(s)");
    println!("  GFP stacks:   {}", paths.gfp_dir.display());
    println!("  RFP stacks:   {}", paths.rfp_dir.display());
    println!("  Projections:  {}", paths.projected_dir.display());
    Ok(())
}
