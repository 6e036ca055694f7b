use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::active::ActiveSliceConfig;
use crate::consts::{DEFAULT_HISTOGRAM_BINS, DEFAULT_OUTPUT_NAME};
use crate::error::Result;
use crate::intensity::CorrectionConfig;
use crate::io::PathSettings;

/// Where the merged per-cell table is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_output_name")]
    pub name: String,
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            name: default_output_name(),
        }
    }
}

impl OutputConfig {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}

/// Everything one analysis run needs besides the image data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub active_slices: ActiveSliceConfig,
    #[serde(default)]
    pub correction: CorrectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.active_slices.validate()?;
        self.correction.validate()?;
        Ok(())
    }
}

/// Protein and condition labels recorded with each run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    pub protein_name: String,
    pub condition: String,
}

impl Default for ExperimentInfo {
    fn default() -> Self {
        Self {
            protein_name: "protein".into(),
            condition: "control".into(),
        }
    }
}

/// Post-analysis summaries written next to the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub stats_summary: bool,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_true() -> bool {
    true
}
fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            stats_summary: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Full configuration of a preprocessing + analysis run, as stored in TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub experiment: ExperimentInfo,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()
    }
}
