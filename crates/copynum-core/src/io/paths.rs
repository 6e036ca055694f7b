use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::RAW_EXTENSIONS;

/// Directory layout and file naming of one experiment.
///
/// Derived files are named after the raw acquisition by replacing its
/// extension with the matching suffix, e.g. `cell01.TIF` with `_GFP.tif`
/// gives `cell01_GFP.tif`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Raw dual-channel acquisitions.
    pub input_dir: PathBuf,
    pub gfp_dir: PathBuf,
    pub rfp_dir: PathBuf,
    /// GFP max projections used for segmentation.
    pub projected_dir: PathBuf,
    pub mask_dir: PathBuf,
    #[serde(default = "default_gfp_suffix")]
    pub gfp_suffix: String,
    #[serde(default = "default_rfp_suffix")]
    pub rfp_suffix: String,
    #[serde(default = "default_projection_suffix")]
    pub projection_suffix: String,
    #[serde(default = "default_mask_suffix")]
    pub mask_suffix: String,
}

fn default_gfp_suffix() -> String {
    "_GFP.tif".into()
}
fn default_rfp_suffix() -> String {
    "_RFP.tif".into()
}
fn default_projection_suffix() -> String {
    "_GFP_MAX.tif".into()
}
fn default_mask_suffix() -> String {
    "_GFP_MAX_cp_masks.png".into()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            gfp_dir: PathBuf::from("data/GFP"),
            rfp_dir: PathBuf::from("data/RFP"),
            projected_dir: PathBuf::from("data/projected"),
            mask_dir: PathBuf::from("data/masks"),
            gfp_suffix: default_gfp_suffix(),
            rfp_suffix: default_rfp_suffix(),
            projection_suffix: default_projection_suffix(),
            mask_suffix: default_mask_suffix(),
        }
    }
}

/// True if `path` has one of the raw acquisition extensions.
pub fn is_raw_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    !hidden
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| RAW_EXTENSIONS.contains(&e))
}

/// Replace the extension of `raw_name` with `suffix`.
pub fn derived_name(raw_name: &str, suffix: &str) -> String {
    let stem = Path::new(raw_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(raw_name);
    format!("{stem}{suffix}")
}

/// Sorted file names of raw acquisitions in `dir`.
pub fn raw_file_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_raw_file(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
