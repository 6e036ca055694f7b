use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::active::ActiveSliceData;
use crate::consts::{DEFAULT_RA, DEFAULT_RG, DEFAULT_SINGLE_MNG_INTENSITY, MIN_RATIO_SEPARATION};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CopyNumError, Result};
use crate::segment::SegmentedData;
use crate::stack::{Channel, ChannelStack};

/// Per-file, per-cell intensity records.
pub type IntensityData = BTreeMap<String, BTreeMap<u32, IntensityRecord>>;

/// Constants of the autofluorescence correction and copy number conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Autofluorescence ratio of the reference (RFP) channel.
    #[serde(default = "default_ra")]
    pub ra: f64,
    /// GFP channel scaling constant. Must differ from `ra`.
    #[serde(default = "default_rg")]
    pub rg: f64,
    /// Integrated intensity of one mNeonGreen molecule. Must be positive.
    #[serde(default = "default_single_mng_intensity")]
    pub single_mng_intensity: f64,
}

fn default_ra() -> f64 {
    DEFAULT_RA
}
fn default_rg() -> f64 {
    DEFAULT_RG
}
fn default_single_mng_intensity() -> f64 {
    DEFAULT_SINGLE_MNG_INTENSITY
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            ra: DEFAULT_RA,
            rg: DEFAULT_RG,
            single_mng_intensity: DEFAULT_SINGLE_MNG_INTENSITY,
        }
    }
}

impl CorrectionConfig {
    pub fn new(ra: f64, rg: f64, single_mng_intensity: f64) -> Result<Self> {
        let config = Self {
            ra,
            rg,
            single_mng_intensity,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.ra.is_finite() || !self.rg.is_finite() {
            return Err(CopyNumError::InvalidConfig(format!(
                "ra and rg must be finite, got ra={} rg={}",
                self.ra, self.rg
            )));
        }
        if (self.rg - self.ra).abs() < MIN_RATIO_SEPARATION {
            return Err(CopyNumError::InvalidConfig(format!(
                "rg must differ from ra (both {})",
                self.rg
            )));
        }
        if !self.single_mng_intensity.is_finite() || self.single_mng_intensity <= 0.0 {
            return Err(CopyNumError::InvalidConfig(format!(
                "single_mng_intensity must be positive, got {}",
                self.single_mng_intensity
            )));
        }
        Ok(())
    }

    /// Remove the RFP-proportional autofluorescence from the GFP total.
    pub fn normalize(&self, gfp_total: f64, rfp_total: f64) -> f64 {
        (self.rg * gfp_total - self.ra * self.rg * rfp_total) / (self.rg - self.ra)
    }

    /// Returns `(normalized_intensity, copy_number)`.
    pub fn correct(&self, gfp_total: f64, rfp_total: f64) -> (f64, f64) {
        let normal = self.normalize(gfp_total, rfp_total);
        (normal, normal / self.single_mng_intensity)
    }
}

/// Summed and corrected intensities of one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityRecord {
    /// GFP sum over the active slices.
    pub total_intensity: f64,
    /// RFP sum over the same slices.
    pub total_background: f64,
    pub total_intensity_normal: f64,
    pub copy_number: f64,
}

fn active_sum(
    stack: &ChannelStack,
    slices: &[usize],
    file: &str,
    cell_id: u32,
) -> Result<f64> {
    slices.iter().try_fold(0.0, |acc, &i| {
        stack
            .slice_sum(i)
            .map(|s| acc + s)
            .ok_or_else(|| CopyNumError::SliceOutOfRange {
                file: file.to_string(),
                cell_id,
                index: i,
                depth: stack.slice_count(),
            })
    })
}

/// Sum both channels over each cell's active slices and convert to copy number.
///
/// A cell with no active slice record is reported and skipped; a record with
/// an empty slice list is valid and yields zero totals.
pub fn cell_intensity(
    segmented: &SegmentedData,
    active: &ActiveSliceData,
    config: &CorrectionConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<IntensityData> {
    let mut result = IntensityData::new();

    for (file, cells) in segmented {
        let mut records = BTreeMap::new();

        for (&cell_id, cell) in cells {
            let Some(record) = active.get(file).and_then(|r| r.get(&cell_id)) else {
                diagnostics.report(Diagnostic::MissingActiveSlices {
                    file: file.clone(),
                    cell_id,
                });
                continue;
            };

            let (Some(gfp), Some(rfp)) = (cell.gfp(), cell.rfp()) else {
                let channel = if cell.gfp().is_none() {
                    Channel::Gfp
                } else {
                    Channel::Rfp
                };
                diagnostics.report(Diagnostic::MissingChannel {
                    file: file.clone(),
                    cell_id,
                    channel,
                });
                continue;
            };

            let gfp_total = active_sum(gfp, &record.active_slices, file, cell_id)?;
            let rfp_total = active_sum(rfp, &record.active_slices, file, cell_id)?;
            let (normal, copy_number) = config.correct(gfp_total, rfp_total);

            if !normal.is_finite() || !copy_number.is_finite() {
                return Err(CopyNumError::NonFiniteIntensity {
                    file: file.clone(),
                    cell_id,
                });
            }

            debug!(file = %file, cell_id, copy_number, "Calculated copy number");
            records.insert(
                cell_id,
                IntensityRecord {
                    total_intensity: gfp_total,
                    total_background: rfp_total,
                    total_intensity_normal: normal,
                    copy_number,
                },
            );
        }

        result.insert(file.clone(), records);
    }

    info!(
        cells = result.values().map(BTreeMap::len).sum::<usize>(),
        "Copy number calculation done"
    );
    Ok(result)
}
