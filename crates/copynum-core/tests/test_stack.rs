use ndarray::{array, Array2, Array3};

use copynum_core::error::CopyNumError;
use copynum_core::stack::{CellMask, Channel, ChannelPair, ChannelStack};

#[test]
fn test_empty_stack_rejected() {
    let data = Array3::<f32>::zeros((0, 4, 4));
    assert!(matches!(
        ChannelStack::new(data),
        Err(CopyNumError::InvalidStack(_))
    ));
}

#[test]
fn test_zero_area_slices_rejected() {
    let data = Array3::<f32>::zeros((3, 0, 4));
    assert!(ChannelStack::new(data).is_err());
}

#[test]
fn test_from_slices_shape_mismatch() {
    let a = Array2::<f32>::zeros((4, 4));
    let b = Array2::<f32>::zeros((4, 5));
    assert!(ChannelStack::from_slices(&[a, b]).is_err());
    assert!(ChannelStack::from_slices(&[]).is_err());
}

#[test]
fn test_slice_sums_and_projection() {
    let s0 = array![[1.0f32, 2.0], [3.0, 4.0]];
    let s1 = array![[5.0f32, 0.0], [0.0, 1.0]];
    let stack = ChannelStack::from_slices(&[s0, s1]).unwrap();

    assert_eq!(stack.slice_count(), 2);
    assert_eq!(stack.slice_shape(), (2, 2));
    assert_eq!(stack.slice_sums(), vec![10.0, 6.0]);
    assert_eq!(stack.slice_sum(1), Some(6.0));
    assert_eq!(stack.slice_sum(2), None);
    assert_eq!(stack.max_projection(), array![[5.0f32, 2.0], [3.0, 4.0]]);
}

#[test]
fn test_channel_pair_shape_mismatch() {
    let gfp = ChannelStack::new(Array3::zeros((3, 4, 4))).unwrap();
    let rfp = ChannelStack::new(Array3::zeros((2, 4, 4))).unwrap();
    assert!(matches!(
        ChannelPair::new(gfp, rfp),
        Err(CopyNumError::ChannelShapeMismatch { .. })
    ));
}

#[test]
fn test_channel_pair_lookup() {
    let gfp = ChannelStack::new(Array3::from_elem((1, 2, 2), 1.0)).unwrap();
    let rfp = ChannelStack::new(Array3::from_elem((1, 2, 2), 2.0)).unwrap();
    let pair = ChannelPair::new(gfp, rfp).unwrap();
    assert_eq!(pair.channel(Channel::Gfp).slice_sums(), vec![4.0]);
    assert_eq!(pair.channel(Channel::Rfp).slice_sums(), vec![8.0]);
}

#[test]
fn test_cell_ids_sorted_without_background() {
    let mask = CellMask::new(array![[0u32, 7, 7], [3, 0, 1], [1, 3, 0]]);
    assert_eq!(mask.cell_ids(), vec![1, 3, 7]);
}

#[test]
fn test_cell_ids_empty_mask() {
    let mask = CellMask::new(Array2::zeros((3, 3)));
    assert!(mask.cell_ids().is_empty());
}

#[test]
fn test_indicator() {
    let mask = CellMask::new(array![[0u32, 2], [2, 1]]);
    assert_eq!(mask.indicator(2), array![[0.0f32, 1.0], [1.0, 0.0]]);
}

#[test]
fn test_channel_display() {
    assert_eq!(Channel::Gfp.to_string(), "GFP");
    assert_eq!(Channel::Rfp.to_string(), "RFP");
}
