#[allow(dead_code)]
mod common;

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use ndarray::Array3;

use copynum_core::active::{find_active_slices, ActiveSliceConfig, ActiveSliceData, ActiveSliceRecord};
use copynum_core::diagnostics::{CollectingDiagnostics, Diagnostic};
use copynum_core::error::CopyNumError;
use copynum_core::intensity::{cell_intensity, CorrectionConfig};
use copynum_core::segment::{segment_stacks, SegmentedCell, SegmentedData};
use copynum_core::stack::{Channel, ChannelStack};

use common::scenario_inputs;

fn scenario_config() -> CorrectionConfig {
    CorrectionConfig::new(0.1, 1.0, 100.0).unwrap()
}

fn single_cell(gfp: ChannelStack, rfp: ChannelStack) -> SegmentedData {
    let cell = SegmentedCell::new("f.TIF", 1, gfp, rfp);
    BTreeMap::from([("f.TIF".to_string(), BTreeMap::from([(1, cell)]))])
}

fn record_with(slices: Vec<usize>) -> ActiveSliceData {
    let record = ActiveSliceRecord {
        focal_slice: 0,
        focal_intensity: 0.0,
        threshold_intensity: 0.0,
        active_slices: slices,
    };
    BTreeMap::from([("f.TIF".to_string(), BTreeMap::from([(1, record)]))])
}

#[test]
fn test_correction_formula() {
    let config = CorrectionConfig::new(0.2, 0.8, 50.0).unwrap();
    let (normal, copies) = config.correct(1000.0, 300.0);
    let expected = (0.8 * 1000.0 - 0.2 * 0.8 * 300.0) / (0.8 - 0.2);
    assert_relative_eq!(normal, expected, epsilon = 1e-9);
    assert_relative_eq!(copies, expected / 50.0, epsilon = 1e-9);
}

#[test]
fn test_copy_number_linear_increasing_in_gfp() {
    let config = scenario_config();
    let rfp = 40.0;
    let samples: Vec<f64> = [0.0, 100.0, 200.0, 300.0]
        .iter()
        .map(|&g| config.correct(g, rfp).1)
        .collect();

    let step = samples[1] - samples[0];
    assert!(step > 0.0);
    for w in samples.windows(2) {
        assert_relative_eq!(w[1] - w[0], step, epsilon = 1e-9);
    }
}

#[test]
fn test_scenario_copy_numbers() {
    let (stacks, masks) = scenario_inputs();
    let diag = CollectingDiagnostics::new();
    let segmented = segment_stacks(&stacks, &masks, &diag);
    let active = find_active_slices(&segmented, &ActiveSliceConfig::default(), &diag);

    let data = cell_intensity(&segmented, &active, &scenario_config(), &diag).unwrap();
    let cells = &data["field01.TIF"];

    assert_relative_eq!(cells[&1].total_intensity, 380.0);
    assert_relative_eq!(cells[&1].total_background, 40.0);
    assert_relative_eq!(cells[&1].copy_number, (380.0 - 0.1 * 40.0) / 0.9 / 100.0, epsilon = 1e-9);

    assert_relative_eq!(cells[&2].total_intensity, 120.0);
    assert_relative_eq!(cells[&2].total_background, 4.0);
    assert_relative_eq!(cells[&2].copy_number, (120.0 - 0.1 * 4.0) / 0.9 / 100.0, epsilon = 1e-9);
    assert!(diag.is_empty());
}

#[test]
fn test_rfp_uses_gfp_active_slices() {
    // RFP is brightest on slice 2, but only GFP decides the window.
    let gfp = ChannelStack::new(Array3::from_shape_fn((3, 1, 1), |(z, _, _)| [9.0, 1.0, 1.0][z])).unwrap();
    let rfp = ChannelStack::new(Array3::from_shape_fn((3, 1, 1), |(z, _, _)| [1.0, 1.0, 9.0][z])).unwrap();
    let segmented = single_cell(gfp, rfp);
    let diag = CollectingDiagnostics::new();
    let active = find_active_slices(&segmented, &ActiveSliceConfig::default(), &diag);
    let data = cell_intensity(&segmented, &active, &scenario_config(), &diag).unwrap();

    assert_eq!(active["f.TIF"][&1].active_slices, vec![0]);
    assert_relative_eq!(data["f.TIF"][&1].total_background, 1.0);
}

#[test]
fn test_all_zero_cell_gives_zero_copy_number() {
    let zero = ChannelStack::new(Array3::zeros((3, 2, 2))).unwrap();
    let segmented = single_cell(zero.clone(), zero);
    let diag = CollectingDiagnostics::new();
    let active = find_active_slices(&segmented, &ActiveSliceConfig::default(), &diag);
    let data = cell_intensity(&segmented, &active, &scenario_config(), &diag).unwrap();

    let record = &data["f.TIF"][&1];
    assert_eq!(record.total_intensity, 0.0);
    assert_eq!(record.total_intensity_normal, 0.0);
    assert_eq!(record.copy_number, 0.0);
    assert!(record.copy_number.is_finite());
}

#[test]
fn test_empty_active_list_is_valid() {
    let stack = ChannelStack::new(Array3::from_elem((2, 2, 2), 5.0)).unwrap();
    let segmented = single_cell(stack.clone(), stack);
    let diag = CollectingDiagnostics::new();

    let data = cell_intensity(&segmented, &record_with(vec![]), &scenario_config(), &diag).unwrap();

    assert_eq!(data["f.TIF"][&1].total_intensity, 0.0);
    assert_eq!(data["f.TIF"][&1].copy_number, 0.0);
    assert!(diag.is_empty());
}

#[test]
fn test_missing_active_record_is_reported() {
    let stack = ChannelStack::new(Array3::from_elem((2, 2, 2), 5.0)).unwrap();
    let segmented = single_cell(stack.clone(), stack);
    let diag = CollectingDiagnostics::new();

    let data = cell_intensity(&segmented, &ActiveSliceData::new(), &scenario_config(), &diag).unwrap();

    assert!(data["f.TIF"].is_empty());
    assert_eq!(
        diag.entries(),
        vec![Diagnostic::MissingActiveSlices {
            file: "f.TIF".into(),
            cell_id: 1,
        }]
    );
}

#[test]
fn test_missing_rfp_is_reported() {
    let gfp = ChannelStack::new(Array3::from_elem((2, 2, 2), 5.0)).unwrap();
    let cell = SegmentedCell::from_channels("f.TIF", 1, [(Channel::Gfp, gfp)]);
    let segmented: SegmentedData =
        BTreeMap::from([("f.TIF".to_string(), BTreeMap::from([(1, cell)]))]);
    let diag = CollectingDiagnostics::new();

    let data = cell_intensity(&segmented, &record_with(vec![0]), &scenario_config(), &diag).unwrap();

    assert!(data["f.TIF"].is_empty());
    assert_eq!(
        diag.entries(),
        vec![Diagnostic::MissingChannel {
            file: "f.TIF".into(),
            cell_id: 1,
            channel: Channel::Rfp,
        }]
    );
}

#[test]
fn test_out_of_range_slice_is_error() {
    let stack = ChannelStack::new(Array3::from_elem((2, 2, 2), 5.0)).unwrap();
    let segmented = single_cell(stack.clone(), stack);
    let result = cell_intensity(
        &segmented,
        &record_with(vec![0, 5]),
        &scenario_config(),
        &CollectingDiagnostics::new(),
    );
    assert!(matches!(
        result,
        Err(CopyNumError::SliceOutOfRange { index: 5, depth: 2, .. })
    ));
}

#[test]
fn test_infinite_intensity_is_error() {
    let gfp = ChannelStack::new(Array3::from_elem((2, 2, 2), f32::INFINITY)).unwrap();
    let rfp = ChannelStack::new(Array3::from_elem((2, 2, 2), 1.0)).unwrap();
    let segmented = single_cell(gfp, rfp);
    let result = cell_intensity(
        &segmented,
        &record_with(vec![0]),
        &scenario_config(),
        &CollectingDiagnostics::new(),
    );
    assert!(matches!(
        result,
        Err(CopyNumError::NonFiniteIntensity { cell_id: 1, .. })
    ));
}

#[test]
fn test_equal_ratios_rejected() {
    assert!(matches!(
        CorrectionConfig::new(0.5, 0.5, 100.0),
        Err(CopyNumError::InvalidConfig(_))
    ));
}

#[test]
fn test_non_positive_single_molecule_rejected() {
    assert!(CorrectionConfig::new(0.1, 1.0, 0.0).is_err());
    assert!(CorrectionConfig::new(0.1, 1.0, -3.0).is_err());
    assert!(CorrectionConfig::new(0.1, 1.0, f64::INFINITY).is_err());
    assert!(CorrectionConfig::new(f64::NAN, 1.0, 100.0).is_err());
}

#[test]
fn test_default_config_is_valid() {
    assert!(CorrectionConfig::default().validate().is_ok());
}
