use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::Array2;

use crate::error::{Result, SipsError};
use crate::sample::Sample;

/// Load a single-frame image, keeping its stored grey values.
///
/// 8- and 16-bit greyscale images are read as-is; any other layout is
/// reduced to 16-bit luminance first.
pub fn load_frame<T: Sample>(path: &Path) -> Result<Array2<T>> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);

    let values: Vec<T> = match img {
        DynamicImage::ImageLuma8(gray) => gray
            .into_raw()
            .into_iter()
            .map(|v| T::from_f64_truncated(v as f64))
            .collect(),
        DynamicImage::ImageLuma16(gray) => gray
            .into_raw()
            .into_iter()
            .map(|v| T::from_f64_truncated(v as f64))
            .collect(),
        other => other
            .to_luma16()
            .into_raw()
            .into_iter()
            .map(|v| T::from_f64_truncated(v as f64))
            .collect(),
    };

    Array2::from_shape_vec((h, w), values).map_err(|_| SipsError::InvalidDimensions {
        width: w as u32,
        height: h as u32,
    })
}

/// `(width, height)` of an image file, from its header only.
pub fn frame_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}

/// Save a frame as 16-bit greyscale TIFF.
pub fn save_tiff_u16(frame: &Array2<u16>, path: &Path) -> Result<()> {
    let (h, w) = frame.dim();
    let pixels: Vec<u16> = frame.iter().copied().collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels).ok_or(
        SipsError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, image::ImageFormat::Tiff)?;
    Ok(())
}
