/// Default relative intensity drop (percent of the focal slice sum) still
/// counted as in focus.
pub const DEFAULT_DROP_THRESHOLD: f64 = 20.0;

/// Default autofluorescence ratio of the reference (RFP) channel.
pub const DEFAULT_RA: f64 = 0.1;

/// Default GFP channel scaling constant.
pub const DEFAULT_RG: f64 = 1.0;

/// Default integrated intensity of a single mNeonGreen molecule (raw counts).
pub const DEFAULT_SINGLE_MNG_INTENSITY: f64 = 100.0;

/// Minimum distance between `rg` and `ra` accepted by the correction config.
pub const MIN_RATIO_SEPARATION: f64 = 1e-12;

/// Separator used when serializing active slice lists into a single cell.
pub const ACTIVE_SLICE_SEPARATOR: &str = ", ";

/// Default file name of the merged per-cell table.
pub const DEFAULT_OUTPUT_NAME: &str = "processed_data.csv";

/// File name of the summary statistics table.
pub const STATS_FILE_NAME: &str = "copy_number_stats.csv";

/// Default number of histogram bins for the copy number distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Raw acquisition file extensions picked up from the input directory.
pub const RAW_EXTENSIONS: [&str; 2] = ["TIF", "tif"];

/// Largest value representable in a 16-bit output TIFF sample.
pub const U16_MAX_F32: f32 = 65535.0;

/// File name of the binned copy number distribution.
pub const HISTOGRAM_FILE_NAME: &str = "copy_number_distribution.csv";
