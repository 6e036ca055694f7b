use std::collections::BTreeMap;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::stack::{CellMask, ChannelPair};

use super::mask::read_mask;
use super::paths::{derived_name, raw_file_names, PathSettings};
use super::tiff_stack::read_stack;

/// Load the GFP and RFP stacks of every raw acquisition in `input_dir`.
///
/// Keys are the raw file names. Missing or unreadable stacks are logged and
/// skipped.
pub fn load_stacks(paths: &PathSettings) -> Result<BTreeMap<String, ChannelPair>> {
    let mut stacks = BTreeMap::new();

    for name in raw_file_names(&paths.input_dir)? {
        let gfp_path = paths.gfp_dir.join(derived_name(&name, &paths.gfp_suffix));
        let rfp_path = paths.rfp_dir.join(derived_name(&name, &paths.rfp_suffix));

        if !gfp_path.exists() {
            warn!(path = %gfp_path.display(), "GFP stack not found");
            continue;
        }
        if !rfp_path.exists() {
            warn!(path = %rfp_path.display(), "RFP stack not found");
            continue;
        }

        let pair = read_stack(&gfp_path)
            .and_then(|gfp| Ok((gfp, read_stack(&rfp_path)?)))
            .and_then(|(gfp, rfp)| ChannelPair::new(gfp, rfp));
        match pair {
            Ok(pair) => {
                info!(file = %name, slices = pair.gfp.slice_count(), "Loaded GFP and RFP stacks");
                stacks.insert(name, pair);
            }
            Err(e) => error!(file = %name, "Failed to load the GFP or RFP stack: {e}"),
        }
    }

    Ok(stacks)
}

/// Load the segmentation mask of every raw acquisition in `input_dir`.
pub fn load_masks(paths: &PathSettings) -> Result<BTreeMap<String, CellMask>> {
    let mut masks = BTreeMap::new();

    for name in raw_file_names(&paths.input_dir)? {
        let mask_path = paths.mask_dir.join(derived_name(&name, &paths.mask_suffix));
        if !mask_path.exists() {
            warn!(path = %mask_path.display(), "Segmentation mask not found");
            continue;
        }

        match read_mask(&mask_path) {
            Ok(mask) => {
                info!(file = %name, cells = mask.cell_ids().len(), "Loaded mask");
                masks.insert(name, mask);
            }
            Err(e) => error!(path = %mask_path.display(), "Failed to load the mask: {e}"),
        }
    }

    Ok(masks)
}
