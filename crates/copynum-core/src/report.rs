use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::active::ActiveSliceData;
use crate::consts::ACTIVE_SLICE_SEPARATOR;
use crate::error::Result;
use crate::intensity::IntensityData;

/// One row of the merged per-cell table.
///
/// Intensity columns are `None` when the cell has an active slice record but
/// no intensity record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRow {
    #[serde(rename = "File Name")]
    pub file: String,
    #[serde(rename = "Cell ID")]
    pub cell_id: u32,
    #[serde(rename = "Focal Slice")]
    pub focal_slice: usize,
    #[serde(rename = "Focal Intensity")]
    pub focal_intensity: f64,
    #[serde(rename = "Threshold Intensity")]
    pub threshold_intensity: f64,
    #[serde(rename = "Active Slices")]
    pub active_slices: String,
    #[serde(rename = "Total Intensity")]
    pub total_intensity: Option<f64>,
    #[serde(rename = "Total Background")]
    pub total_background: Option<f64>,
    #[serde(rename = "Total Intensity Normal")]
    pub total_intensity_normal: Option<f64>,
    #[serde(rename = "Copy Number")]
    pub copy_number: Option<f64>,
}

impl CellRow {
    /// Parse the serialized active slice list back into indices.
    pub fn active_slice_indices(&self) -> Vec<usize> {
        self.active_slices
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

/// Join slice indices with the table separator (`"0, 1, 2"`).
pub fn format_active_slices(slices: &[usize]) -> String {
    slices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(ACTIVE_SLICE_SEPARATOR)
}

/// Merge active slice and intensity records into one row per cell.
pub fn assemble_table(active: &ActiveSliceData, intensity: &IntensityData) -> Vec<CellRow> {
    let mut rows = Vec::new();
    for (file, records) in active {
        for (&cell_id, record) in records {
            let values = intensity.get(file).and_then(|cells| cells.get(&cell_id));
            rows.push(CellRow {
                file: file.clone(),
                cell_id,
                focal_slice: record.focal_slice,
                focal_intensity: record.focal_intensity,
                threshold_intensity: record.threshold_intensity,
                active_slices: format_active_slices(&record.active_slices),
                total_intensity: values.map(|v| v.total_intensity),
                total_background: values.map(|v| v.total_background),
                total_intensity_normal: values.map(|v| v.total_intensity_normal),
                copy_number: values.map(|v| v.copy_number),
            });
        }
    }
    info!(rows = rows.len(), "Assembled per-cell table");
    rows
}

/// Write the table as CSV with a header row.
pub fn write_table(rows: &[CellRow], path: &Path) -> Result<()> {
    let write = || -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    };

    match write() {
        Ok(()) => {
            info!(path = %path.display(), rows = rows.len(), "Saved processed data");
            Ok(())
        }
        Err(e) => {
            error!(path = %path.display(), "Error while saving CSV file: {e}");
            Err(e)
        }
    }
}

/// Read a table previously written by [`write_table`].
pub fn read_table(path: &Path) -> Result<Vec<CellRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<CellRow>, _>>()?;
    Ok(rows)
}

/// Read only the `Copy Number` column of a table, skipping empty cells.
///
/// Returns `Ok(None)` if the table has no such column.
pub fn read_copy_numbers(path: &Path) -> Result<Option<Vec<f64>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let Some(column) = reader.headers()?.iter().position(|h| h == "Copy Number") else {
        return Ok(None);
    };

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(v) = record.get(column).and_then(|s| s.trim().parse().ok()) {
            values.push(v);
        }
    }
    Ok(Some(values))
}
