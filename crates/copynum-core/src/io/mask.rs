use std::path::Path;

use image::DynamicImage;
use ndarray::Array2;
use num_traits::Float;
use tiff::decoder::DecodingResult;

use crate::error::{CopyNumError, Result};
use crate::stack::CellMask;

use super::tiff_stack::{open_decoder, page_dimensions};

fn non_label<T: std::fmt::Display>(value: T) -> CopyNumError {
    CopyNumError::UnsupportedFormat(format!("mask contains non-label value {value}"))
}

fn integer_labels<T>(buf: &[T]) -> Result<Vec<u32>>
where
    T: Copy + std::fmt::Display + TryInto<u32>,
{
    buf.iter()
        .map(|&v| v.try_into().map_err(|_| non_label(v)))
        .collect()
}

fn float_labels<T: Float + std::fmt::Display>(buf: &[T]) -> Result<Vec<u32>> {
    buf.iter()
        .map(|&v| {
            if v.fract() != T::zero() {
                return Err(non_label(v));
            }
            v.to_u32().ok_or_else(|| non_label(v))
        })
        .collect()
}

/// Decode the first page of a TIFF label image without a float round trip.
fn read_tiff_labels(path: &Path) -> Result<Array2<u32>> {
    let mut decoder = open_decoder(path)?;
    let (width, height) = page_dimensions(&mut decoder)?;

    let labels = match decoder.read_image()? {
        DecodingResult::U8(buf) => integer_labels(&buf)?,
        DecodingResult::U16(buf) => integer_labels(&buf)?,
        DecodingResult::U32(buf) => buf,
        DecodingResult::U64(buf) => integer_labels(&buf)?,
        DecodingResult::F32(buf) => float_labels(&buf)?,
        DecodingResult::F64(buf) => float_labels(&buf)?,
        _ => {
            return Err(CopyNumError::UnsupportedFormat(
                "mask samples must be unsigned integers".into(),
            ))
        }
    };

    let (h, w) = (height as usize, width as usize);
    if labels.len() != h * w {
        return Err(CopyNumError::UnsupportedFormat(format!(
            "expected {} single-channel mask samples, got {}",
            h * w,
            labels.len()
        )));
    }
    Array2::from_shape_vec((h, w), labels).map_err(|e| CopyNumError::InvalidStack(e.to_string()))
}

/// Load a segmentation label image.
///
/// TIFF masks are read through the TIFF decoder (first page, up to 32-bit
/// labels); other formats must be 8- or 16-bit grayscale. Label values are
/// taken verbatim, never rescaled.
pub fn read_mask(path: &Path) -> Result<CellMask> {
    let is_tiff = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"));

    if is_tiff {
        return Ok(CellMask::new(read_tiff_labels(path)?));
    }

    let labels = match image::open(path)? {
        DynamicImage::ImageLuma8(img) => {
            let (w, h) = img.dimensions();
            Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
                img.get_pixel(c as u32, r as u32).0[0] as u32
            })
        }
        DynamicImage::ImageLuma16(img) => {
            let (w, h) = img.dimensions();
            Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
                img.get_pixel(c as u32, r as u32).0[0] as u32
            })
        }
        other => {
            return Err(CopyNumError::UnsupportedFormat(format!(
                "mask must be single-channel grayscale, got {:?}",
                other.color()
            )))
        }
    };
    Ok(CellMask::new(labels))
}
