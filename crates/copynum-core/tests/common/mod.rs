use std::collections::BTreeMap;

use ndarray::{Array2, Array3};

use copynum_core::stack::{CellMask, ChannelPair, ChannelStack};

/// Build a stack of shape (z, h, w) from a per-pixel function.
pub fn stack_from_fn(
    shape: (usize, usize, usize),
    f: impl Fn(usize, usize, usize) -> f32,
) -> ChannelStack {
    ChannelStack::new(Array3::from_shape_fn(shape, |(z, r, c)| f(z, r, c))).expect("valid stack")
}

/// 4x4 mask: cell 1 in the top-left 2x2 block, cell 2 in the bottom-right
/// 2x2 block, background elsewhere.
pub fn two_cell_mask() -> CellMask {
    CellMask::new(Array2::from_shape_fn((4, 4), |(r, c)| match (r < 2, c < 2) {
        (true, true) => 1,
        (false, false) => 2,
        _ => 0,
    }))
}

/// Per-pixel GFP values of the two-cell scenario.
///
/// Cell 1 slice sums: [40, 200, 180]; cell 2: [120, 80, 20]. Background
/// pixels are bright so that any masking error shows up in the sums.
pub fn scenario_gfp() -> ChannelStack {
    const CELL1: [f32; 3] = [10.0, 50.0, 45.0];
    const CELL2: [f32; 3] = [30.0, 20.0, 5.0];
    stack_from_fn((3, 4, 4), |z, r, c| match (r < 2, c < 2) {
        (true, true) => CELL1[z],
        (false, false) => CELL2[z],
        _ => 1000.0,
    })
}

/// Per-pixel RFP values of the two-cell scenario.
///
/// Cell 1 slice sums: [8, 16, 24]; cell 2: [4, 4, 4].
pub fn scenario_rfp() -> ChannelStack {
    const CELL1: [f32; 3] = [2.0, 4.0, 6.0];
    stack_from_fn((3, 4, 4), |z, r, c| match (r < 2, c < 2) {
        (true, true) => CELL1[z],
        (false, false) => 1.0,
        _ => 500.0,
    })
}

pub fn scenario_inputs() -> (BTreeMap<String, ChannelPair>, BTreeMap<String, CellMask>) {
    let pair = ChannelPair::new(scenario_gfp(), scenario_rfp()).expect("aligned pair");
    let stacks = BTreeMap::from([("field01.TIF".to_string(), pair)]);
    let masks = BTreeMap::from([("field01.TIF".to_string(), two_cell_mask())]);
    (stacks, masks)
}
