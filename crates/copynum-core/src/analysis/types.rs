use crate::active::ProfileObserver;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};

/// Analysis processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisStage {
    Segmentation,
    ActiveSlices,
    Intensity,
    Writing,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segmentation => write!(f, "Segmenting cells"),
            Self::ActiveSlices => write!(f, "Finding active slices"),
            Self::Intensity => write!(f, "Calculating copy numbers"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the analysis.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g., cell count), if known.
    fn begin_stage(&self, _stage: AnalysisStage, _total_items: Option<usize>) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_analysis` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Collaborators injected into one analysis run.
pub struct AnalysisHooks<'a> {
    pub diagnostics: &'a dyn Diagnostics,
    pub reporter: &'a dyn ProgressReporter,
    /// Receives intensity profiles when `plot_intensity_profile` is set.
    pub profile_observer: Option<&'a mut dyn ProfileObserver>,
}

impl<'a> AnalysisHooks<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            diagnostics,
            reporter,
            profile_observer: None,
        }
    }

    pub fn with_profile_observer(mut self, observer: &'a mut dyn ProfileObserver) -> Self {
        self.profile_observer = Some(observer);
        self
    }
}

impl Default for AnalysisHooks<'static> {
    fn default() -> Self {
        Self::new(&TracingDiagnostics, &NoOpReporter)
    }
}
