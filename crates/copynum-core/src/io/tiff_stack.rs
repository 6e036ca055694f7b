use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::Luma;
use ndarray::Array2;
use num_traits::ToPrimitive;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;

use crate::consts::U16_MAX_F32;
use crate::error::{CopyNumError, Result};
use crate::stack::ChannelStack;

/// Upper bound for a single decoded page (1 GiB).
const PAGE_BUFFER_LIMIT: usize = 1024 * 1024 * 1024;

pub(crate) fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)?;
    let mut limits = Limits::default();
    limits.decoding_buffer_size = PAGE_BUFFER_LIMIT;
    limits.intermediate_buffer_size = PAGE_BUFFER_LIMIT;
    Ok(Decoder::new(BufReader::new(file))?.with_limits(limits))
}

fn buffer_to_array<T: ToPrimitive + Copy>(buf: &[T], width: u32, height: u32) -> Result<Array2<f32>> {
    let (h, w) = (height as usize, width as usize);
    if buf.len() != h * w {
        return Err(CopyNumError::UnsupportedFormat(format!(
            "expected {} single-channel samples, got {}",
            h * w,
            buf.len()
        )));
    }
    let values: Vec<f32> = buf.iter().map(|v| v.to_f32().unwrap_or(0.0)).collect();
    Array2::from_shape_vec((h, w), values)
        .map_err(|e| CopyNumError::InvalidStack(e.to_string()))
}

/// Dimensions of the current page as (width, height); rejects non-grayscale pages.
pub(crate) fn page_dimensions(decoder: &mut Decoder<BufReader<File>>) -> Result<(u32, u32)> {
    let dims = decoder.dimensions()?;
    let color = decoder.colortype()?;
    if !matches!(color, ColorType::Gray(_)) {
        return Err(CopyNumError::UnsupportedFormat(format!(
            "expected grayscale pages, got {color:?}"
        )));
    }
    Ok(dims)
}

/// Decode the current page of `decoder` into a (height, width) array.
fn read_page(decoder: &mut Decoder<BufReader<File>>) -> Result<Array2<f32>> {
    let (width, height) = page_dimensions(decoder)?;

    match decoder.read_image()? {
        DecodingResult::U8(buf) => buffer_to_array(&buf, width, height),
        DecodingResult::U16(buf) => buffer_to_array(&buf, width, height),
        DecodingResult::U32(buf) => buffer_to_array(&buf, width, height),
        DecodingResult::F32(buf) => buffer_to_array(&buf, width, height),
        DecodingResult::F64(buf) => buffer_to_array(&buf, width, height),
        _ => Err(CopyNumError::UnsupportedFormat(
            "only unsigned integer and float samples are supported".into(),
        )),
    }
}

/// Read a multi-page grayscale TIFF as a z-stack, one page per slice.
pub fn read_stack(path: &Path) -> Result<ChannelStack> {
    let mut decoder = open_decoder(path)?;
    let mut slices = Vec::new();
    loop {
        slices.push(read_page(&mut decoder)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }
    ChannelStack::from_slices(&slices)
}

fn to_u16(v: f32) -> u16 {
    v.round().clamp(0.0, U16_MAX_F32) as u16
}

/// Write a z-stack as a 16-bit multi-page TIFF. Values are rounded and
/// clamped to the u16 range.
pub fn write_stack(path: &Path, stack: &ChannelStack) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let (h, w) = stack.slice_shape();

    for slice in stack.data().outer_iter() {
        let pixels: Vec<u16> = slice.iter().map(|&v| to_u16(v)).collect();
        encoder.write_image::<colortype::Gray16>(w as u32, h as u32, &pixels)?;
    }
    Ok(())
}

/// Save a 2-D projection as a 16-bit grayscale TIFF.
pub fn save_projection(path: &Path, projection: &Array2<f32>) -> Result<()> {
    let (h, w) = projection.dim();
    let pixels: Vec<u16> = projection.iter().map(|&v| to_u16(v)).collect();
    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| CopyNumError::InvalidStack("projection buffer size mismatch".into()))?;
    img.save(path)?;
    Ok(())
}
