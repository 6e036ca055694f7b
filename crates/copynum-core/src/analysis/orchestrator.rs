use std::collections::BTreeMap;
use std::path::Path;

use tracing::{error, info};

use crate::active::{find_active_slices, observe_profiles};
use crate::error::{CopyNumError, Result};
use crate::intensity::cell_intensity;
use crate::report::{assemble_table, write_table, CellRow};
use crate::segment::{cell_count, segment_stacks};
use crate::stack::{CellMask, ChannelPair};

use super::config::AnalysisConfig;
use super::types::{AnalysisHooks, AnalysisStage};

fn any_records<T>(data: &BTreeMap<String, BTreeMap<u32, T>>) -> bool {
    data.values().any(|cells| !cells.is_empty())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!(dir = %parent.display(), "Could not create output directory: {e}");
            return Err(e.into());
        }
    }
    Ok(())
}

/// Run segmentation, active slice detection and copy number calculation,
/// then write the merged table to `config.output`.
///
/// Each stage that yields nothing aborts the run with its own error.
pub fn run_analysis_reported(
    stacks: &BTreeMap<String, ChannelPair>,
    masks: &BTreeMap<String, CellMask>,
    config: &AnalysisConfig,
    hooks: AnalysisHooks<'_>,
) -> Result<Vec<CellRow>> {
    config.validate()?;
    let AnalysisHooks {
        diagnostics,
        reporter,
        profile_observer,
    } = hooks;

    // Segmentation
    reporter.begin_stage(AnalysisStage::Segmentation, Some(stacks.len()));
    let segmented = segment_stacks(stacks, masks, diagnostics);
    reporter.finish_stage();
    if segmented.is_empty() {
        error!("No cells were segmented. Aborting processing.");
        return Err(CopyNumError::SegmentationEmpty);
    }
    let cells = cell_count(&segmented);
    info!(files = segmented.len(), cells, "Segmentation complete");

    // Active slices
    reporter.begin_stage(AnalysisStage::ActiveSlices, Some(cells));
    let active = find_active_slices(&segmented, &config.active_slices, diagnostics);
    reporter.finish_stage();
    if !any_records(&active) {
        error!("No active slices found for any cells. Aborting processing.");
        return Err(CopyNumError::ActiveSlicesEmpty);
    }

    if config.active_slices.plot_intensity_profile {
        if let Some(observer) = profile_observer {
            observe_profiles(&segmented, &active, observer);
        }
    }

    // Intensity
    reporter.begin_stage(AnalysisStage::Intensity, Some(cells));
    let intensity = cell_intensity(&segmented, &active, &config.correction, diagnostics);
    reporter.finish_stage();
    let intensity = intensity?;
    if !any_records(&intensity) {
        error!("No intensity data calculated. Aborting processing.");
        return Err(CopyNumError::IntensityEmpty);
    }

    // Merge + write
    reporter.begin_stage(AnalysisStage::Writing, None);
    let rows = assemble_table(&active, &intensity);
    if rows.is_empty() {
        reporter.finish_stage();
        error!("Merging completed, but final dataset is empty.");
        return Err(CopyNumError::OutputEmpty);
    }
    let path = config.output.path();
    let written = ensure_parent_dir(&path).and_then(|()| write_table(&rows, &path));
    reporter.finish_stage();
    written?;

    info!(cells = rows.len(), "Processing completed");
    Ok(rows)
}

/// Run the analysis with tracing diagnostics and no progress reporting.
pub fn run_analysis(
    stacks: &BTreeMap<String, ChannelPair>,
    masks: &BTreeMap<String, CellMask>,
    config: &AnalysisConfig,
) -> Result<Vec<CellRow>> {
    run_analysis_reported(stacks, masks, config, AnalysisHooks::default())
}
