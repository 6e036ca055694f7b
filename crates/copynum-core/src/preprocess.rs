use ndarray::{s, Array3};
use tracing::{error, info};

use crate::error::Result;
use crate::io::paths::{derived_name, raw_file_names, PathSettings};
use crate::io::{read_stack, save_projection, write_stack};
use crate::stack::{ChannelPair, ChannelStack};

/// Split a side-by-side dual-channel acquisition into its two channels.
///
/// Each slice is cut at `width / 2`: the left half is RFP, the right half GFP.
/// With an odd width the GFP half gets the extra column, so the two stacks
/// differ in width and are returned separately rather than as a pair.
pub fn split_channels(raw: &ChannelStack) -> Result<(ChannelStack, ChannelStack)> {
    let middle = raw.width() / 2;
    let data: &Array3<f32> = raw.data();
    let rfp = ChannelStack::new(data.slice(s![.., .., ..middle]).to_owned())?;
    let gfp = ChannelStack::new(data.slice(s![.., .., middle..]).to_owned())?;
    Ok((gfp, rfp))
}

/// Split a raw acquisition into an aligned GFP/RFP pair.
pub fn split_pair(raw: &ChannelStack) -> Result<ChannelPair> {
    let (gfp, rfp) = split_channels(raw)?;
    ChannelPair::new(gfp, rfp)
}

fn preprocess_file(name: &str, paths: &PathSettings) -> Result<()> {
    let raw = read_stack(&paths.input_dir.join(name))?;
    let (gfp, rfp) = split_channels(&raw)?;
    let projection = gfp.max_projection();

    let gfp_path = paths.gfp_dir.join(derived_name(name, &paths.gfp_suffix));
    let rfp_path = paths.rfp_dir.join(derived_name(name, &paths.rfp_suffix));
    let proj_path = paths
        .projected_dir
        .join(derived_name(name, &paths.projection_suffix));

    write_stack(&gfp_path, &gfp)?;
    write_stack(&rfp_path, &rfp)?;
    save_projection(&proj_path, &projection)?;
    info!(file = %name, slices = gfp.slice_count(), "Split channels and saved projection");
    Ok(())
}

/// Split every raw acquisition in `input_dir` into GFP and RFP stacks and
/// write the GFP max projection used for segmentation.
///
/// Failures on individual files are logged and skipped. Returns the number
/// of files processed successfully.
pub fn preprocess_directory(paths: &PathSettings) -> Result<usize> {
    std::fs::create_dir_all(&paths.gfp_dir)?;
    std::fs::create_dir_all(&paths.rfp_dir)?;
    std::fs::create_dir_all(&paths.projected_dir)?;

    let mut processed = 0;
    for name in raw_file_names(&paths.input_dir)? {
        match preprocess_file(&name, paths) {
            Ok(()) => processed += 1,
            Err(e) => error!(file = %name, "Error processing: {e}"),
        }
    }

    info!(processed, "Preprocessing completed");
    Ok(processed)
}
