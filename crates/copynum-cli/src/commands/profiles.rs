use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use copynum_core::active::{ProfileObserver, ProfileView};
use tracing::error;

const HEADER: [&str; 7] = [
    "File Name",
    "Cell ID",
    "Slice",
    "Intensity",
    "Threshold Intensity",
    "Focal",
    "Active",
];

/// Writes every observed intensity profile as long-format CSV rows
/// (one row per slice) for external plotting.
///
/// The first write error stops further output and is returned by [`finish`].
///
/// [`finish`]: ProfileCsvWriter::finish
pub struct ProfileCsvWriter<W: Write = File> {
    writer: csv::Writer<W>,
    failure: Option<String>,
}

impl ProfileCsvWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::from_csv(writer)
    }
}

impl<W: Write> ProfileCsvWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        Self::from_csv(csv::Writer::from_writer(inner))
    }

    fn from_csv(mut writer: csv::Writer<W>) -> Result<Self> {
        writer.write_record(HEADER)?;
        Ok(Self {
            writer,
            failure: None,
        })
    }

    /// Flush the output. Fails if any profile could not be written.
    pub fn finish(mut self) -> Result<()> {
        if let Some(e) = self.failure.take() {
            return Err(anyhow!("Intensity profiles are incomplete: {e}"));
        }
        self.writer.flush().context("Failed to flush intensity profiles")?;
        Ok(())
    }

    fn write_view(&mut self, view: &ProfileView<'_>) -> csv::Result<()> {
        for (slice, intensity) in view.profile.iter().enumerate() {
            self.writer.write_record([
                view.file.to_string(),
                view.cell_id.to_string(),
                slice.to_string(),
                format!("{intensity:.6}"),
                format!("{:.6}", view.record.threshold_intensity),
                (slice == view.record.focal_slice).to_string(),
                view.record.active_slices.contains(&slice).to_string(),
            ])?;
        }
        Ok(())
    }
}

impl<W: Write> ProfileObserver for ProfileCsvWriter<W> {
    fn observe(&mut self, view: ProfileView<'_>) {
        if self.failure.is_some() {
            return;
        }
        if let Err(e) = self.write_view(&view) {
            error!("Failed to write intensity profile: {e}");
            self.failure = Some(e.to_string());
        }
    }
}
