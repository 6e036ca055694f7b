use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyNumError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid stack: {0}")]
    InvalidStack(String),

    #[error("Channel shape mismatch: GFP {gfp:?} vs RFP {rfp:?}")]
    ChannelShapeMismatch {
        gfp: (usize, usize, usize),
        rfp: (usize, usize, usize),
    },

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Slice index {index} out of range for cell {cell_id} in {file} (depth: {depth})")]
    SliceOutOfRange {
        file: String,
        cell_id: u32,
        index: usize,
        depth: usize,
    },

    #[error("Non-finite corrected intensity for cell {cell_id} in {file}")]
    NonFiniteIntensity { file: String, cell_id: u32 },

    #[error("Segmentation produced no cells")]
    SegmentationEmpty,

    #[error("Active slice extraction produced no records")]
    ActiveSlicesEmpty,

    #[error("Intensity calculation produced no records")]
    IntensityEmpty,

    #[error("Merged output table is empty")]
    OutputEmpty,
}

pub type Result<T> = std::result::Result<T, CopyNumError>;
