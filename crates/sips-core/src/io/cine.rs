//! Phantom `.cine` container reader.
//!
//! Layout: a 44-byte file header, a BITMAPINFOHEADER describing every image,
//! then a table of 64-bit image offsets. Each image starts with a 32-bit
//! annotation size, followed by the annotation and the pixel rows, stored
//! bottom-up when the bitmap height is positive.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{Result, SipsError};
use crate::frame::{SourceInfo, SourceKind};
use crate::sample::Sample;

pub const CINE_MAGIC: &[u8; 2] = b"CI";
pub const CINE_FILE_HEADER_SIZE: usize = 44;
pub const BITMAP_INFO_HEADER_SIZE: usize = 40;

/// Fields of the file header needed to locate images.
#[derive(Clone, Debug)]
pub struct CineHeader {
    pub compression: u16,
    pub image_count: u32,
    pub off_image_header: u32,
    pub off_image_offsets: u32,
}

/// Image geometry and encoding shared by all frames.
#[derive(Clone, Debug)]
pub struct BitmapInfo {
    pub width: u32,
    pub height: u32,
    pub bottom_up: bool,
    pub bit_count: u16,
    pub compression: u32,
}

impl BitmapInfo {
    fn bytes_per_sample(&self) -> usize {
        if self.bit_count <= 8 {
            1
        } else {
            2
        }
    }

    fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(self.bytes_per_sample()))
            .ok_or_else(|| {
                SipsError::InvalidContainer(format!(
                    "frame size {}x{} overflows",
                    self.width, self.height
                ))
            })
    }
}

/// Memory-mapped Cine reader for uncompressed 8/16-bit greyscale recordings.
pub struct CineReader {
    mmap: Mmap,
    pub header: CineHeader,
    pub bitmap: BitmapInfo,
    offsets: Vec<u64>,
    frame_size: usize,
}

impl CineReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < CINE_FILE_HEADER_SIZE {
            return Err(SipsError::InvalidContainer(
                "file too small for Cine header".into(),
            ));
        }
        if &mmap[0..2] != CINE_MAGIC {
            return Err(SipsError::InvalidContainer("missing CI magic".into()));
        }

        let header = parse_file_header(&mmap[..CINE_FILE_HEADER_SIZE])?;
        if header.compression == 1 {
            return Err(SipsError::DecodingUnavailable(
                "JPEG-compressed Cine recordings are not supported".into(),
            ));
        }

        let bmp_start = header.off_image_header as usize;
        let bmp_end = bmp_start + BITMAP_INFO_HEADER_SIZE;
        if mmap.len() < bmp_end {
            return Err(SipsError::InvalidContainer(
                "bitmap header lies beyond end of file".into(),
            ));
        }
        let bitmap = parse_bitmap_header(&mmap[bmp_start..bmp_end])?;
        if bitmap.compression != 0 || !matches!(bitmap.bit_count, 8 | 16) {
            return Err(SipsError::DecodingUnavailable(format!(
                "Cine pixel encoding {} at {} bits per pixel",
                bitmap.compression, bitmap.bit_count
            )));
        }

        let frame_size = bitmap.frame_byte_size()?;

        let table_start = header.off_image_offsets as usize;
        let table_end = (header.image_count as usize)
            .checked_mul(8)
            .and_then(|len| len.checked_add(table_start));
        let Some(table_end) = table_end.filter(|&end| end <= mmap.len()) else {
            return Err(SipsError::InvalidContainer(
                "image offset table truncated".into(),
            ));
        };
        let mut cursor = Cursor::new(&mmap[table_start..table_end]);
        let offsets = (0..header.image_count)
            .map(|_| cursor.read_u64::<LittleEndian>())
            .collect::<std::io::Result<Vec<u64>>>()?;

        Ok(Self {
            mmap,
            header,
            bitmap,
            offsets,
            frame_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.offsets.len()
    }

    fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let total = self.frame_count();
        let pointer = *self
            .offsets
            .get(index)
            .ok_or(SipsError::FrameIndexOutOfRange { index, total })?;
        let pointer = usize::try_from(pointer).map_err(|_| truncated(index))?;

        let annotation = pointer
            .checked_add(4)
            .and_then(|end| self.mmap.get(pointer..end))
            .ok_or_else(|| truncated(index))?;
        let annotation_size = u32::from_le_bytes([
            annotation[0],
            annotation[1],
            annotation[2],
            annotation[3],
        ]) as usize;

        let start = pointer
            .checked_add(annotation_size)
            .ok_or_else(|| truncated(index))?;
        start
            .checked_add(self.frame_size)
            .and_then(|end| self.mmap.get(start..end))
            .ok_or_else(|| truncated(index))
    }

    /// Decode one frame into sample type `T`, top row first.
    pub fn read_frame<T: Sample>(&self, index: usize) -> Result<Array2<T>> {
        let raw = self.frame_raw(index)?;
        let h = self.bitmap.height as usize;
        let w = self.bitmap.width as usize;
        let bps = self.bitmap.bytes_per_sample();
        let bottom_up = self.bitmap.bottom_up;

        Ok(Array2::from_shape_fn((h, w), |(row, col)| {
            let stored_row = if bottom_up { h - 1 - row } else { row };
            let idx = (stored_row * w + col) * bps;
            let val = if bps == 1 {
                raw[idx] as f64
            } else {
                u16::from_le_bytes([raw[idx], raw[idx + 1]]) as f64
            };
            T::from_f64_truncated(val)
        }))
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            path: path.to_path_buf(),
            kind: SourceKind::Cine,
            total_frames: self.frame_count(),
            width: self.bitmap.width,
            height: self.bitmap.height,
            bit_depth: self.bitmap.bit_count as u8,
        }
    }
}

fn truncated(index: usize) -> SipsError {
    SipsError::InvalidContainer(format!("image {index} lies beyond end of file"))
}

fn parse_file_header(buf: &[u8]) -> Result<CineHeader> {
    let mut cursor = Cursor::new(&buf[2..]); // skip magic
    let _header_size = cursor.read_u16::<LittleEndian>()?;
    let compression = cursor.read_u16::<LittleEndian>()?;
    let _version = cursor.read_u16::<LittleEndian>()?;
    let _first_movie_image = cursor.read_i32::<LittleEndian>()?;
    let _total_image_count = cursor.read_u32::<LittleEndian>()?;
    let _first_image_no = cursor.read_i32::<LittleEndian>()?;
    let image_count = cursor.read_u32::<LittleEndian>()?;
    let off_image_header = cursor.read_u32::<LittleEndian>()?;
    let _off_setup = cursor.read_u32::<LittleEndian>()?;
    let off_image_offsets = cursor.read_u32::<LittleEndian>()?;

    Ok(CineHeader {
        compression,
        image_count,
        off_image_header,
        off_image_offsets,
    })
}

fn parse_bitmap_header(buf: &[u8]) -> Result<BitmapInfo> {
    let mut cursor = Cursor::new(buf);
    let _size = cursor.read_u32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?;
    let height = cursor.read_i32::<LittleEndian>()?;
    let _planes = cursor.read_u16::<LittleEndian>()?;
    let bit_count = cursor.read_u16::<LittleEndian>()?;
    let compression = cursor.read_u32::<LittleEndian>()?;

    if width <= 0 || height == 0 {
        return Err(SipsError::InvalidDimensions {
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
        });
    }

    Ok(BitmapInfo {
        width: width as u32,
        height: height.unsigned_abs(),
        bottom_up: height > 0,
        bit_count,
        compression,
    })
}
