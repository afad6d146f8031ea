use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SipsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid frame range {start}..={end} (available frames: {available})")]
    InvalidRange {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("Decoding support unavailable: {0}")]
    DecodingUnavailable(String),

    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    #[error("Invalid array file: {0}")]
    InvalidArray(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Invalid comparison mode value: {0}")]
    InvalidMode(u8),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Background worker failed: {0}")]
    Worker(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SipsError>;
