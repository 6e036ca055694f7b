pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{run_analysis, run_analysis_reported};
pub use types::{AnalysisHooks, AnalysisStage, ProgressReporter};
