use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::stack::{CellMask, Channel, ChannelPair, ChannelStack};

/// Per-file, per-cell segmented sub-stacks.
pub type SegmentedData = BTreeMap<String, BTreeMap<u32, SegmentedCell>>;

/// Channel stacks of one cell, with every pixel outside its footprint zeroed.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentedCell {
    pub file: String,
    pub cell_id: u32,
    channels: BTreeMap<Channel, ChannelStack>,
}

impl SegmentedCell {
    pub fn new(file: impl Into<String>, cell_id: u32, gfp: ChannelStack, rfp: ChannelStack) -> Self {
        let channels = BTreeMap::from([(Channel::Gfp, gfp), (Channel::Rfp, rfp)]);
        Self {
            file: file.into(),
            cell_id,
            channels,
        }
    }

    /// Build a cell from an arbitrary set of channels. Consumers treat a
    /// missing channel as a recoverable condition.
    pub fn from_channels(
        file: impl Into<String>,
        cell_id: u32,
        channels: impl IntoIterator<Item = (Channel, ChannelStack)>,
    ) -> Self {
        Self {
            file: file.into(),
            cell_id,
            channels: channels.into_iter().collect(),
        }
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelStack> {
        self.channels.get(&channel)
    }

    pub fn gfp(&self) -> Option<&ChannelStack> {
        self.channel(Channel::Gfp)
    }

    pub fn rfp(&self) -> Option<&ChannelStack> {
        self.channel(Channel::Rfp)
    }
}

/// Total number of segmented cells across all files.
pub fn cell_count(data: &SegmentedData) -> usize {
    data.values().map(BTreeMap::len).sum()
}

/// Restrict both channel stacks of one field of view to the footprint of `label`.
pub fn segment_cell(file: &str, pair: &ChannelPair, mask: &CellMask, label: u32) -> SegmentedCell {
    SegmentedCell::new(
        file,
        label,
        pair.gfp.masked(&mask.labels, label),
        pair.rfp.masked(&mask.labels, label),
    )
}

/// Segment every field of view into per-cell sub-stacks using its label mask.
///
/// Files without a mask, with an empty mask, or with a mask whose shape does
/// not match the stack slices are reported to `diagnostics` and skipped.
/// Cells of one file are segmented in parallel; the result is ordered by
/// file name and cell id.
pub fn segment_stacks(
    stacks: &BTreeMap<String, ChannelPair>,
    masks: &BTreeMap<String, CellMask>,
    diagnostics: &dyn Diagnostics,
) -> SegmentedData {
    let mut segmented = SegmentedData::new();

    for (file, pair) in stacks {
        let Some(mask) = masks.get(file) else {
            diagnostics.report(Diagnostic::MissingMask { file: file.clone() });
            continue;
        };

        if mask.shape() != pair.slice_shape() {
            diagnostics.report(Diagnostic::MaskShapeMismatch {
                file: file.clone(),
                mask: mask.shape(),
                slice: pair.slice_shape(),
            });
            continue;
        }

        let cell_ids = mask.cell_ids();
        if cell_ids.is_empty() {
            diagnostics.report(Diagnostic::EmptyMask { file: file.clone() });
            continue;
        }

        let cells: BTreeMap<u32, SegmentedCell> = cell_ids
            .par_iter()
            .map(|&id| (id, segment_cell(file, pair, mask, id)))
            .collect();

        for id in cells.keys() {
            debug!(file = %file, cell_id = id, "Segmented cell");
        }
        info!(file = %file, cells = cells.len(), "Segmented field of view");
        segmented.insert(file.clone(), cells);
    }

    segmented
}
