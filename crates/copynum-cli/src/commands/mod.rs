pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod preprocess;
pub mod profiles;
pub mod summarize;

use std::path::Path;

use anyhow::{Context, Result};
use copynum_core::analysis::config::PipelineConfig;

/// Read and validate a TOML pipeline config.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PipelineConfig = toml::from_str(&contents).context("Invalid pipeline config")?;
    config.validate().context("Invalid pipeline config")?;
    Ok(config)
}
