use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use ndarray::{Array3, Axis};
use tracing::info;

use crate::consts::{DEFAULT_VIDEO_FPS, EXPORT_INDEX_DIGITS};
use crate::convert::convert_to_u8;
use crate::error::{Result, SipsError};
use crate::frame::ProcessedFrame;
use crate::io::image_io::save_tiff_u16;
use crate::io::npy::write_npy;

/// Destination of a bulk export. Frames arrive in ascending index order.
pub trait FrameSink {
    /// Called once before the first frame with the output geometry.
    fn begin(&mut self, frame_count: usize, height: usize, width: usize) -> Result<()>;

    /// `index` is the frame's index in the rendered sequence.
    fn write_frame(&mut self, index: usize, frame: &ProcessedFrame) -> Result<()>;

    fn finish(&mut self) -> Result<()>;
}

/// One 16-bit TIFF per frame, named by zero-padded frame index (`0042.tif`).
///
/// Float frames are rescaled to the full 16-bit range; 16-bit frames are
/// written unchanged.
pub struct TiffSequenceSink {
    dir: PathBuf,
    written: usize,
}

impl TiffSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{index:0width$}.tif", width = EXPORT_INDEX_DIGITS))
    }
}

impl FrameSink for TiffSequenceSink {
    fn begin(&mut self, _frame_count: usize, _height: usize, _width: usize) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn write_frame(&mut self, index: usize, frame: &ProcessedFrame) -> Result<()> {
        let data = frame.clone().into_u16();
        save_tiff_u16(&data, &self.frame_path(index))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!(frames = self.written, dir = %self.dir.display(), "TIFF sequence written");
        Ok(())
    }
}

/// 8-bit greyscale animated GIF played back at `fps`, looping forever.
///
/// Every frame is rescaled from its own min/max to the full 8-bit range.
pub struct VideoSink {
    path: PathBuf,
    fps: u32,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    expected: usize,
    written: usize,
}

impl VideoSink {
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            path: path.into(),
            fps: if fps == 0 { DEFAULT_VIDEO_FPS } else { fps },
            encoder: None,
            expected: 0,
            written: 0,
        }
    }

    /// Display time of one frame.
    pub fn frame_delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.fps)
    }
}

impl FrameSink for VideoSink {
    fn begin(&mut self, frame_count: usize, _height: usize, _width: usize) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder.set_repeat(Repeat::Infinite)?;
        self.encoder = Some(encoder);
        self.expected = frame_count;
        self.written = 0;
        Ok(())
    }

    fn write_frame(&mut self, _index: usize, frame: &ProcessedFrame) -> Result<()> {
        let delay = self.frame_delay();
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| SipsError::Worker("video sink used before begin".into()))?;
        let data = match frame {
            ProcessedFrame::Float32(data) => convert_to_u8(data),
            ProcessedFrame::Uint16(data) => convert_to_u8(data),
        };
        let (h, w) = data.dim();
        let image = RgbaImage::from_fn(w as u32, h as u32, |x, y| {
            let v = data[[y as usize, x as usize]];
            Rgba([v, v, v, 255])
        });
        encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| SipsError::Worker("video sink finished before begin".into()))?;
        if self.written != self.expected {
            return Err(SipsError::InvalidContainer(format!(
                "video expected {} frames, {} written",
                self.expected, self.written
            )));
        }
        // Dropping the encoder writes the GIF trailer.
        drop(encoder);
        info!(frames = self.written, fps = self.fps, path = %self.path.display(), "Video written");
        Ok(())
    }
}

/// All frames packed into one `(height, width, frames)` `f32` array on disk.
pub struct ArraySink {
    path: PathBuf,
    buffer: Option<Array3<f32>>,
    next_slot: usize,
}

impl ArraySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: None,
            next_slot: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for ArraySink {
    fn begin(&mut self, frame_count: usize, height: usize, width: usize) -> Result<()> {
        self.buffer = Some(Array3::zeros((height, width, frame_count)));
        self.next_slot = 0;
        Ok(())
    }

    fn write_frame(&mut self, _index: usize, frame: &ProcessedFrame) -> Result<()> {
        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| SipsError::Worker("array sink used before begin".into()))?;
        let (h, w, n) = buffer.dim();
        if self.next_slot >= n {
            return Err(SipsError::FrameIndexOutOfRange {
                index: self.next_slot,
                total: n,
            });
        }
        if frame.dim() != (h, w) {
            return Err(SipsError::ShapeMismatch {
                expected: (h, w),
                actual: frame.dim(),
            });
        }
        buffer
            .index_axis_mut(Axis(2), self.next_slot)
            .assign(&frame.to_f32());
        self.next_slot += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let buffer = self
            .buffer
            .take()
            .ok_or_else(|| SipsError::Worker("array sink finished before begin".into()))?;
        write_npy(&self.path, &buffer)?;
        info!(shape = ?buffer.dim(), path = %self.path.display(), "Array written");
        Ok(())
    }
}
