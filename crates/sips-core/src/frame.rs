use ndarray::Array2;
use std::path::PathBuf;

use crate::convert::convert_to_u16;

/// A single processed frame in its working sample type.
///
/// The enhancement chain starts in `f32`; the denoise and CLAHE stages move the
/// frame into the 16-bit unsigned range.
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessedFrame {
    Float32(Array2<f32>),
    Uint16(Array2<u16>),
}

impl ProcessedFrame {
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Self::Float32(data) => data.dim(),
            Self::Uint16(data) => data.dim(),
        }
    }

    pub fn width(&self) -> usize {
        self.dim().1
    }

    pub fn height(&self) -> usize {
        self.dim().0
    }

    /// Sample values as `f32`, without rescaling.
    pub fn to_f32(&self) -> Array2<f32> {
        match self {
            Self::Float32(data) => data.clone(),
            Self::Uint16(data) => data.mapv(|v| v as f32),
        }
    }

    /// 16-bit representation: `Uint16` frames are returned as-is, float frames
    /// are rescaled from their own min/max to the full 16-bit range.
    pub fn into_u16(self) -> Array2<u16> {
        match self {
            Self::Float32(data) => convert_to_u16(&data),
            Self::Uint16(data) => data,
        }
    }
}

/// Which kind of source a path refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Phantom high-speed camera container.
    Cine,
    /// Whole-array `.npy` file.
    StoredArray,
    /// Directory holding one image file per frame.
    ImageDirectory,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cine => write!(f, "Cine container"),
            Self::StoredArray => write!(f, "Stored array"),
            Self::ImageDirectory => write!(f, "Image directory"),
        }
    }
}

/// Metadata about a source, read without decoding pixel data.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
}
