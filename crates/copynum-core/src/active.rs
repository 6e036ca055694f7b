use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::DEFAULT_DROP_THRESHOLD;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CopyNumError, Result};
use crate::segment::SegmentedData;
use crate::stack::Channel;

/// Per-file, per-cell active slice records.
pub type ActiveSliceData = BTreeMap<String, BTreeMap<u32, ActiveSliceRecord>>;

/// Settings for in-focus slice detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSliceConfig {
    /// Allowed intensity drop below the focal slice, in percent (0..=100).
    #[serde(default = "default_drop_threshold")]
    pub drop_threshold: f64,
    /// Emit per-cell intensity profiles to the profile observer.
    #[serde(default)]
    pub plot_intensity_profile: bool,
}

fn default_drop_threshold() -> f64 {
    DEFAULT_DROP_THRESHOLD
}

impl Default for ActiveSliceConfig {
    fn default() -> Self {
        Self {
            drop_threshold: DEFAULT_DROP_THRESHOLD,
            plot_intensity_profile: false,
        }
    }
}

impl ActiveSliceConfig {
    pub fn new(drop_threshold: f64, plot_intensity_profile: bool) -> Result<Self> {
        let config = Self {
            drop_threshold,
            plot_intensity_profile,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.drop_threshold) {
            return Err(CopyNumError::InvalidConfig(format!(
                "drop_threshold must be within [0, 100], got {}",
                self.drop_threshold
            )));
        }
        Ok(())
    }
}

/// Focus window of one cell, derived from its GFP intensity profile.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSliceRecord {
    pub focal_slice: usize,
    pub focal_intensity: f64,
    pub threshold_intensity: f64,
    /// Ascending slice indices whose intensity is at or above the threshold.
    pub active_slices: Vec<usize>,
}

/// Index of the first maximum of `profile`.
pub fn focal_slice(profile: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in profile.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Threshold below the focal intensity by `drop_threshold` percent of its magnitude.
pub fn threshold_intensity(focal_intensity: f64, drop_threshold: f64) -> f64 {
    focal_intensity - focal_intensity.abs() * drop_threshold / 100.0
}

/// Select the in-focus slices of one intensity profile.
///
/// Returns `None` for an empty profile or one with no comparable values.
pub fn detect_active_slices(profile: &[f64], drop_threshold: f64) -> Option<ActiveSliceRecord> {
    let focal = focal_slice(profile)?;
    let focal_intensity = profile[focal];
    let threshold = threshold_intensity(focal_intensity, drop_threshold);

    let active_slices = profile
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v >= threshold)
        .map(|(i, _)| i)
        .collect();

    Some(ActiveSliceRecord {
        focal_slice: focal,
        focal_intensity,
        threshold_intensity: threshold,
        active_slices,
    })
}

/// One cell's profile together with the decision made on it.
#[derive(Clone, Copy, Debug)]
pub struct ProfileView<'a> {
    pub file: &'a str,
    pub cell_id: u32,
    pub profile: &'a [f64],
    pub record: &'a ActiveSliceRecord,
}

/// Read-only hook receiving every detected profile once detection is complete.
pub trait ProfileObserver {
    fn observe(&mut self, view: ProfileView<'_>);
}

/// Detect the active slices of every segmented cell from its GFP stack.
///
/// Cells without a GFP stack, or whose profile has no comparable value, are
/// reported and skipped.
pub fn find_active_slices(
    segmented: &SegmentedData,
    config: &ActiveSliceConfig,
    diagnostics: &dyn Diagnostics,
) -> ActiveSliceData {
    let mut result = ActiveSliceData::new();

    for (file, cells) in segmented {
        let mut records = BTreeMap::new();

        for (&cell_id, cell) in cells {
            let Some(gfp) = cell.gfp() else {
                diagnostics.report(Diagnostic::MissingChannel {
                    file: file.clone(),
                    cell_id,
                    channel: Channel::Gfp,
                });
                continue;
            };

            let profile = gfp.slice_sums();
            let Some(record) = detect_active_slices(&profile, config.drop_threshold) else {
                diagnostics.report(Diagnostic::UndefinedProfile {
                    file: file.clone(),
                    cell_id,
                });
                continue;
            };

            if record.focal_intensity <= 0.0 {
                diagnostics.report(Diagnostic::DegenerateProfile {
                    file: file.clone(),
                    cell_id,
                    focal_intensity: record.focal_intensity,
                });
            }

            debug!(
                file = %file,
                cell_id,
                focal_slice = record.focal_slice,
                active = ?record.active_slices,
                "Cell focus window"
            );
            records.insert(cell_id, record);
        }

        result.insert(file.clone(), records);
    }

    info!(
        cells = result.values().map(BTreeMap::len).sum::<usize>(),
        "Extracted active slices"
    );
    result
}

/// Hand every finished record, with its GFP profile, to `observer`.
///
/// Runs strictly after [`find_active_slices`]; the observer only sees
/// shared references and cannot change any decision.
pub fn observe_profiles(
    segmented: &SegmentedData,
    active: &ActiveSliceData,
    observer: &mut dyn ProfileObserver,
) {
    for (file, records) in active {
        for (&cell_id, record) in records {
            let Some(gfp) = segmented
                .get(file)
                .and_then(|cells| cells.get(&cell_id))
                .and_then(|cell| cell.gfp())
            else {
                continue;
            };
            let profile = gfp.slice_sums();
            observer.observe(ProfileView {
                file,
                cell_id,
                profile: &profile,
                record,
            });
        }
    }
}
