use std::sync::Mutex;
use std::time::Duration;

use copynum_core::analysis::{AnalysisStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives one spinner per analysis stage.
#[derive(Default)]
pub struct SpinnerReporter {
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for SpinnerReporter {
    fn begin_stage(&self, stage: AnalysisStage, total_items: Option<usize>) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        let msg = match total_items {
            Some(n) => format!("{stage} ({n})"),
            None => stage.to_string(),
        };
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut current) = self.current.lock() {
            if let Some(prev) = current.replace(pb) {
                prev.finish_and_clear();
            }
        }
    }

    fn finish_stage(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(pb) = current.take() {
                pb.finish_and_clear();
            }
        }
    }
}
