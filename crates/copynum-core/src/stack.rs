use std::collections::BTreeSet;

use ndarray::{Array2, Array3, Axis, Zip};

use crate::error::{CopyNumError, Result};

/// Fluorescence detection band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Signal channel.
    Gfp,
    /// Reference channel used for the autofluorescence term.
    Rfp,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gfp => write!(f, "GFP"),
            Self::Rfp => write!(f, "RFP"),
        }
    }
}

/// A z-stack of one channel of one field of view.
/// Pixel values are raw detector counts, shape = (slices, height, width).
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelStack {
    data: Array3<f32>,
}

impl ChannelStack {
    /// Wrap a (z, y, x) array. Rejects stacks with no slices or empty slices.
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let (z, h, w) = data.dim();
        if z == 0 {
            return Err(CopyNumError::InvalidStack("stack has no slices".into()));
        }
        if h == 0 || w == 0 {
            return Err(CopyNumError::InvalidStack(format!(
                "slices have zero area ({h}x{w})"
            )));
        }
        Ok(Self { data })
    }

    /// Build a stack from individual slices, which must all share one shape.
    pub fn from_slices(slices: &[Array2<f32>]) -> Result<Self> {
        let first = slices
            .first()
            .ok_or_else(|| CopyNumError::InvalidStack("stack has no slices".into()))?;
        let (h, w) = first.dim();
        let mut data = Array3::<f32>::zeros((slices.len(), h, w));
        for (i, slice) in slices.iter().enumerate() {
            if slice.dim() != (h, w) {
                return Err(CopyNumError::InvalidStack(format!(
                    "slice {i} is {:?}, expected {:?}",
                    slice.dim(),
                    (h, w)
                )));
            }
            data.index_axis_mut(Axis(0), i).assign(slice);
        }
        Self::new(data)
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn into_data(self) -> Array3<f32> {
        self.data
    }

    pub fn slice_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Spatial shape of one slice as (height, width).
    pub fn slice_shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Sum of all pixel values of one slice.
    pub fn slice_sum(&self, index: usize) -> Option<f64> {
        if index >= self.slice_count() {
            return None;
        }
        Some(
            self.data
                .index_axis(Axis(0), index)
                .iter()
                .map(|&v| v as f64)
                .sum(),
        )
    }

    /// Per-slice intensity profile along z.
    pub fn slice_sums(&self) -> Vec<f64> {
        self.data
            .outer_iter()
            .map(|slice| slice.iter().map(|&v| v as f64).sum())
            .collect()
    }

    /// Per-pixel maximum over z.
    pub fn max_projection(&self) -> Array2<f32> {
        self.data
            .fold_axis(Axis(0), f32::NEG_INFINITY, |&acc, &v| acc.max(v))
    }

    /// Keep only the pixels where `labels` equals `label`; all others become 0,
    /// including non-finite background values.
    pub(crate) fn masked(&self, labels: &Array2<u32>, label: u32) -> Self {
        let mut data = self.data.clone();
        for mut slice in data.outer_iter_mut() {
            Zip::from(&mut slice).and(labels).for_each(|v, &l| {
                if l != label {
                    *v = 0.0;
                }
            });
        }
        Self { data }
    }
}

/// The GFP and RFP stacks of one field of view, spatially aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelPair {
    pub gfp: ChannelStack,
    pub rfp: ChannelStack,
}

impl ChannelPair {
    pub fn new(gfp: ChannelStack, rfp: ChannelStack) -> Result<Self> {
        if gfp.data.dim() != rfp.data.dim() {
            return Err(CopyNumError::ChannelShapeMismatch {
                gfp: gfp.data.dim(),
                rfp: rfp.data.dim(),
            });
        }
        Ok(Self { gfp, rfp })
    }

    pub fn channel(&self, channel: Channel) -> &ChannelStack {
        match channel {
            Channel::Gfp => &self.gfp,
            Channel::Rfp => &self.rfp,
        }
    }

    pub fn slice_shape(&self) -> (usize, usize) {
        self.gfp.slice_shape()
    }
}

/// Integer label image: 0 is background, every positive value one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellMask {
    pub labels: Array2<u32>,
}

impl CellMask {
    pub fn new(labels: Array2<u32>) -> Self {
        Self { labels }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.labels.dim()
    }

    /// Distinct positive labels in ascending order.
    pub fn cell_ids(&self) -> Vec<u32> {
        self.labels
            .iter()
            .copied()
            .filter(|&l| l != 0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 1.0 where the mask equals `label`, 0.0 elsewhere.
    pub fn indicator(&self, label: u32) -> Array2<f32> {
        self.labels.mapv(|l| if l == label { 1.0 } else { 0.0 })
    }
}
