#[allow(dead_code)]
mod common;

use std::collections::BTreeMap;
use std::sync::Mutex;

use approx::assert_relative_eq;
use ndarray::Array2;
use tempfile::TempDir;

use copynum_core::active::{ActiveSliceConfig, ProfileObserver, ProfileView};
use copynum_core::analysis::config::{AnalysisConfig, OutputConfig};
use copynum_core::analysis::{run_analysis, run_analysis_reported, AnalysisHooks, AnalysisStage, ProgressReporter};
use copynum_core::diagnostics::CollectingDiagnostics;
use copynum_core::error::CopyNumError;
use copynum_core::intensity::CorrectionConfig;
use copynum_core::report::read_table;
use copynum_core::stack::{CellMask, ChannelPair};

use common::{scenario_gfp, scenario_inputs, stack_from_fn, two_cell_mask};

fn scenario_config(dir: &TempDir) -> AnalysisConfig {
    AnalysisConfig {
        active_slices: ActiveSliceConfig::new(20.0, false).unwrap(),
        correction: CorrectionConfig::new(0.1, 1.0, 100.0).unwrap(),
        output: OutputConfig {
            dir: dir.path().to_path_buf(),
            name: "processed.csv".into(),
        },
    }
}

#[derive(Default)]
struct StageLog {
    stages: Mutex<Vec<AnalysisStage>>,
    finished: Mutex<usize>,
}

impl StageLog {
    fn all_finished(&self) -> bool {
        *self.finished.lock().unwrap() == self.stages.lock().unwrap().len()
    }
}

impl ProgressReporter for StageLog {
    fn begin_stage(&self, stage: AnalysisStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn finish_stage(&self) {
        *self.finished.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct CountingObserver {
    calls: usize,
}

impl ProfileObserver for CountingObserver {
    fn observe(&mut self, _view: ProfileView<'_>) {
        self.calls += 1;
    }
}

#[test]
fn test_end_to_end_two_cells() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let config = scenario_config(&dir);

    let rows = run_analysis(&stacks, &masks, &config).unwrap();

    assert_eq!(rows.len(), 2);
    let cell1 = &rows[0];
    assert_eq!(cell1.file, "field01.TIF");
    assert_eq!(cell1.cell_id, 1);
    assert_eq!(cell1.focal_slice, 1);
    assert_relative_eq!(cell1.focal_intensity, 200.0);
    assert_relative_eq!(cell1.threshold_intensity, 160.0);
    assert_eq!(cell1.active_slices, "1, 2");
    assert_relative_eq!(cell1.total_intensity.unwrap(), 380.0);
    assert_relative_eq!(cell1.total_background.unwrap(), 40.0);
    assert_relative_eq!(
        cell1.copy_number.unwrap(),
        (380.0 - 0.1 * 40.0) / 0.9 / 100.0,
        epsilon = 1e-9
    );

    let cell2 = &rows[1];
    assert_eq!(cell2.cell_id, 2);
    assert_eq!(cell2.focal_slice, 0);
    assert_eq!(cell2.active_slices, "0");
    assert_relative_eq!(
        cell2.copy_number.unwrap(),
        (120.0 - 0.1 * 4.0) / 0.9 / 100.0,
        epsilon = 1e-9
    );

    assert!(dir.path().join("processed.csv").exists());
}

#[test]
fn test_csv_round_trip_preserves_copy_numbers() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let config = scenario_config(&dir);

    let rows = run_analysis(&stacks, &masks, &config).unwrap();
    let loaded = read_table(&config.output.path()).unwrap();

    assert_eq!(loaded.len(), rows.len());
    for (a, b) in rows.iter().zip(&loaded) {
        assert_eq!(a.file, b.file);
        assert_eq!(a.cell_id, b.cell_id);
        assert_eq!(a.active_slices, b.active_slices);
        assert_relative_eq!(a.copy_number.unwrap(), b.copy_number.unwrap(), epsilon = 1e-12);
    }
    assert_eq!(loaded[0].active_slice_indices(), vec![1, 2]);
}

#[test]
fn test_csv_header() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let config = scenario_config(&dir);
    run_analysis(&stacks, &masks, &config).unwrap();

    let contents = std::fs::read_to_string(config.output.path()).unwrap();
    let header = contents.lines().next().unwrap();
    assert_eq!(
        header,
        "File Name,Cell ID,Focal Slice,Focal Intensity,Threshold Intensity,Active Slices,\
         Total Intensity,Total Background,Total Intensity Normal,Copy Number"
    );
}

#[test]
fn test_empty_mask_mapping_aborts_at_segmentation() {
    let dir = TempDir::new().unwrap();
    let (stacks, _) = scenario_inputs();
    let config = scenario_config(&dir);
    let reporter = StageLog::default();
    let diag = CollectingDiagnostics::new();

    let result = run_analysis_reported(
        &stacks,
        &BTreeMap::new(),
        &config,
        AnalysisHooks::new(&diag, &reporter),
    );

    assert!(matches!(result, Err(CopyNumError::SegmentationEmpty)));
    assert_eq!(*reporter.stages.lock().unwrap(), vec![AnalysisStage::Segmentation]);
    assert!(!config.output.path().exists());
}

#[test]
fn test_all_empty_masks_abort_at_segmentation() {
    let dir = TempDir::new().unwrap();
    let (stacks, _) = scenario_inputs();
    let masks = BTreeMap::from([(
        "field01.TIF".to_string(),
        CellMask::new(Array2::zeros((4, 4))),
    )]);

    let result = run_analysis(&stacks, &masks, &scenario_config(&dir));
    assert!(matches!(result, Err(CopyNumError::SegmentationEmpty)));
}

#[test]
fn test_invalid_config_rejected_before_running() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let mut config = scenario_config(&dir);
    config.correction.ra = config.correction.rg;
    let reporter = StageLog::default();
    let diag = CollectingDiagnostics::new();

    let result = run_analysis_reported(&stacks, &masks, &config, AnalysisHooks::new(&diag, &reporter));

    assert!(matches!(result, Err(CopyNumError::InvalidConfig(_))));
    assert!(reporter.stages.lock().unwrap().is_empty());
}

#[test]
fn test_stages_reported_in_order() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let reporter = StageLog::default();
    let diag = CollectingDiagnostics::new();

    run_analysis_reported(
        &stacks,
        &masks,
        &scenario_config(&dir),
        AnalysisHooks::new(&diag, &reporter),
    )
    .unwrap();

    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![
            AnalysisStage::Segmentation,
            AnalysisStage::ActiveSlices,
            AnalysisStage::Intensity,
            AnalysisStage::Writing,
        ]
    );
}

#[test]
fn test_profile_observer_only_when_enabled() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let diag = CollectingDiagnostics::new();
    let reporter = StageLog::default();

    let mut observer = CountingObserver::default();
    let config = scenario_config(&dir);
    let disabled = run_analysis_reported(
        &stacks,
        &masks,
        &config,
        AnalysisHooks::new(&diag, &reporter).with_profile_observer(&mut observer),
    )
    .unwrap();
    assert_eq!(observer.calls, 0);

    let mut config = scenario_config(&dir);
    config.active_slices.plot_intensity_profile = true;
    let enabled = run_analysis_reported(
        &stacks,
        &masks,
        &config,
        AnalysisHooks::new(&diag, &reporter).with_profile_observer(&mut observer),
    )
    .unwrap();
    assert_eq!(observer.calls, 2);
    assert_eq!(disabled, enabled);
}

#[test]
fn test_output_directory_created() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let mut config = scenario_config(&dir);
    config.output.dir = dir.path().join("nested").join("out");

    run_analysis(&stacks, &masks, &config).unwrap();
    assert!(config.output.path().exists());
}

#[test]
fn test_unwritable_output_is_propagated() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let mut config = scenario_config(&dir);
    // The output name points at an existing directory.
    std::fs::create_dir(dir.path().join("taken")).unwrap();
    config.output.name = "taken".into();

    let log = StageLog::default();
    let diag = CollectingDiagnostics::new();
    let result = run_analysis_reported(&stacks, &masks, &config, AnalysisHooks::new(&diag, &log));

    assert!(matches!(
        result,
        Err(CopyNumError::Csv(_)) | Err(CopyNumError::Io(_))
    ));
    assert_eq!(log.stages.lock().unwrap().last(), Some(&AnalysisStage::Writing));
    assert!(log.all_finished());
}

#[test]
fn test_output_dir_under_file_is_error() {
    let dir = TempDir::new().unwrap();
    let (stacks, masks) = scenario_inputs();
    let mut config = scenario_config(&dir);
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();
    config.output.dir = file.join("out");

    let log = StageLog::default();
    let diag = CollectingDiagnostics::new();
    let result = run_analysis_reported(&stacks, &masks, &config, AnalysisHooks::new(&diag, &log));

    assert!(matches!(result, Err(CopyNumError::Io(_))));
    assert!(log.all_finished());
}

#[test]
fn test_intensity_failure_finishes_stage() {
    let dir = TempDir::new().unwrap();
    // Infinite RFP inside cell 1 makes its corrected intensity non-finite.
    let rfp = stack_from_fn((3, 4, 4), |_, r, c| if r < 2 && c < 2 { f32::INFINITY } else { 1.0 });
    let stacks = BTreeMap::from([(
        "field01.TIF".to_string(),
        ChannelPair::new(scenario_gfp(), rfp).unwrap(),
    )]);
    let masks = BTreeMap::from([("field01.TIF".to_string(), two_cell_mask())]);

    let log = StageLog::default();
    let diag = CollectingDiagnostics::new();
    let result = run_analysis_reported(
        &stacks,
        &masks,
        &scenario_config(&dir),
        AnalysisHooks::new(&diag, &log),
    );

    assert!(matches!(
        result,
        Err(CopyNumError::NonFiniteIntensity { cell_id: 1, .. })
    ));
    assert_eq!(log.stages.lock().unwrap().last(), Some(&AnalysisStage::Intensity));
    assert!(log.all_finished());
}
