use std::io::Write;
use std::path::Path;

use ndarray::{Array2, Array3};
use tempfile::{NamedTempFile, TempDir};

#[cfg(feature = "cine")]
use sips_core::io::cine::{BITMAP_INFO_HEADER_SIZE, CINE_FILE_HEADER_SIZE};
use sips_core::io::image_io::save_tiff_u16;

/// Build an uncompressed 8-bit Cine file.
///
/// `frames` are given top row first; they are stored bottom-up, as a
/// positive bitmap height requires.
#[cfg(feature = "cine")]
pub fn build_cine_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let count = frames.len() as u32;
    let off_image_header = CINE_FILE_HEADER_SIZE as u32;
    let off_image_offsets = off_image_header + BITMAP_INFO_HEADER_SIZE as u32;

    let mut buf = Vec::new();
    buf.extend_from_slice(b"CI");
    buf.extend_from_slice(&(CINE_FILE_HEADER_SIZE as u16).to_le_bytes());
    // Compression, Version
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    // FirstMovieImage, TotalImageCount, FirstImageNo, ImageCount
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    // OffImageHeader, OffSetup, OffImageOffsets
    buf.extend_from_slice(&off_image_header.to_le_bytes());
    buf.extend_from_slice(&off_image_offsets.to_le_bytes());
    buf.extend_from_slice(&off_image_offsets.to_le_bytes());
    // TriggerTime
    buf.extend_from_slice(&[0u8; 8]);
    assert_eq!(buf.len(), CINE_FILE_HEADER_SIZE);

    buf.extend_from_slice(&(BITMAP_INFO_HEADER_SIZE as u32).to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&8u16.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&[0u8; 24]);
    assert_eq!(buf.len(), off_image_offsets as usize);

    let annotation_size = 8usize;
    let image_size = annotation_size + (width * height) as usize;
    let first_image = off_image_offsets as usize + frames.len() * 8;
    for i in 0..frames.len() {
        buf.extend_from_slice(&((first_image + i * image_size) as u64).to_le_bytes());
    }

    let w = width as usize;
    for frame in frames {
        buf.extend_from_slice(&(annotation_size as u32).to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]);
        for row in frame.chunks(w).rev() {
            buf.extend_from_slice(row);
        }
    }
    buf
}

/// Write bytes to a temporary file with the given extension (e.g. ".cine").
pub fn write_temp_file(data: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(data).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[cfg(feature = "cine")]
pub fn write_test_cine(width: u32, height: u32, frames: &[Vec<u8>]) -> NamedTempFile {
    write_temp_file(&build_cine_with_frames(width, height, frames), ".cine")
}

/// Write each frame as `<name>` 16-bit TIFF into `dir`.
pub fn write_tiff_frames(dir: &Path, names: &[&str], frames: &[Array2<u16>]) {
    for (name, frame) in names.iter().zip(frames) {
        save_tiff_u16(frame, &dir.join(name)).expect("write tiff");
    }
}

/// Directory of `frame<k>.tif` files where every pixel of frame `k` is `k`.
pub fn constant_tiff_dir(width: usize, height: usize, count: usize) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for k in 0..count {
        let frame = Array2::from_elem((height, width), k as u16);
        save_tiff_u16(&frame, &dir.path().join(format!("frame{k}.tif"))).expect("write tiff");
    }
    dir
}

/// Frames of constant value `k` for frame `k`.
pub fn constant_frames_u8(width: u32, height: u32, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|k| vec![k as u8; (width * height) as usize])
        .collect()
}

/// Stack where every pixel of frame `k` equals `values[k]`.
pub fn stack_from_values(h: usize, w: usize, values: &[f32]) -> Array3<f32> {
    Array3::from_shape_fn((h, w, values.len()), |(_, _, k)| values[k])
}

/// Row-major ramp `row * w + col`.
pub fn ramp(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32)
}
