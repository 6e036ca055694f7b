use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use copynum_core::analysis::config::PipelineConfig;
use serde::Serialize;

/// Provenance of one run, saved alongside its outputs.
#[derive(Serialize)]
struct RunMetadata<'a> {
    timestamp: u64,
    user: String,
    hostname: String,
    os: &'static str,
    arch: &'static str,
    copynum_version: &'static str,
    git_commit: String,
    config_used: &'a PipelineConfig,
}

fn git_commit_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Not a Git repo or Git not available".into())
}

fn env_or_unknown(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| std::env::var(k).ok())
        .unwrap_or_else(|| "unknown".into())
}

/// Write `metadata_<protein>_<condition>_<timestamp>.toml` into `output_dir`.
pub fn save_run_metadata(config: &PipelineConfig, output_dir: &Path) -> Result<PathBuf> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let metadata = RunMetadata {
        timestamp,
        user: env_or_unknown(&["USER", "USERNAME"]),
        hostname: env_or_unknown(&["HOSTNAME", "COMPUTERNAME"]),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        copynum_version: env!("CARGO_PKG_VERSION"),
        git_commit: git_commit_hash(),
        config_used: config,
    };

    let name = format!(
        "metadata_{}_{}_{}.toml",
        config.experiment.protein_name, config.experiment.condition, timestamp
    );
    let path = output_dir.join(name);
    let contents = toml::to_string_pretty(&metadata)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write metadata to {}", path.display()))?;
    Ok(path)
}
