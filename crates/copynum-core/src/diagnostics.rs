use std::sync::Mutex;

use tracing::warn;

use crate::stack::Channel;

/// A recoverable condition encountered while processing one file or cell.
/// The affected entry is skipped and processing continues.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A field of view has image stacks but no segmentation mask.
    MissingMask { file: String },
    /// The mask contains no positive labels.
    EmptyMask { file: String },
    /// The mask shape does not match the stack slice shape.
    MaskShapeMismatch {
        file: String,
        mask: (usize, usize),
        slice: (usize, usize),
    },
    /// A segmented cell lacks one of its channel sub-stacks.
    MissingChannel {
        file: String,
        cell_id: u32,
        channel: Channel,
    },
    /// No active slice record exists for a segmented cell.
    MissingActiveSlices { file: String, cell_id: u32 },
    /// No slice sum of the cell can be compared (all NaN), so no focal slice
    /// exists.
    UndefinedProfile { file: String, cell_id: u32 },
    /// The focal slice sum is zero or negative.
    DegenerateProfile {
        file: String,
        cell_id: u32,
        focal_intensity: f64,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMask { file } => write!(f, "mask was not found for {file}"),
            Self::EmptyMask { file } => write!(f, "{file} does not contain any cell"),
            Self::MaskShapeMismatch { file, mask, slice } => write!(
                f,
                "mask of {file} is {}x{} but stack slices are {}x{}",
                mask.0, mask.1, slice.0, slice.1
            ),
            Self::MissingChannel {
                file,
                cell_id,
                channel,
            } => write!(f, "cell {cell_id} in {file} has no {channel} stack"),
            Self::MissingActiveSlices { file, cell_id } => {
                write!(f, "no active slice record for cell {cell_id} in {file}")
            }
            Self::UndefinedProfile { file, cell_id } => {
                write!(f, "cell {cell_id} in {file} has no comparable slice intensity")
            }
            Self::DegenerateProfile {
                file,
                cell_id,
                focal_intensity,
            } => write!(
                f,
                "cell {cell_id} in {file} has a non-positive focal intensity ({focal_intensity})"
            ),
        }
    }
}

/// Sink for recoverable diagnostics raised by the analysis stages.
pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing` at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
    }
}

/// Keeps diagnostics in memory, in the order they were reported.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
