//! `.npy` stored-array reading and writing.
//!
//! Reads format versions 1.0 to 3.0 with little-endian `u1`, `u2`, `i2`,
//! `i4`, `f4` and `f8` data in C or Fortran order. Writes version 1.0 in C
//! order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use ndarray::{Array3, ArrayBase, Axis, Data, Dimension, IxDyn, ShapeBuilder};
use tracing::debug;

use crate::error::{Result, SipsError};
use crate::sample::Sample;

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";
const HEADER_ALIGNMENT: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dtype {
    U8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self> {
        match descr {
            "|u1" | "<u1" | "u1" => Ok(Self::U8),
            "<u2" => Ok(Self::U16),
            "<i2" => Ok(Self::I16),
            "<i4" => Ok(Self::I32),
            "<f4" => Ok(Self::F32),
            "<f8" => Ok(Self::F64),
            other => Err(SipsError::InvalidArray(format!(
                "unsupported dtype descriptor '{other}'"
            ))),
        }
    }

    fn read_value(self, reader: &mut impl Read) -> std::io::Result<f64> {
        Ok(match self {
            Self::U8 => reader.read_u8()? as f64,
            Self::U16 => reader.read_u16::<LittleEndian>()? as f64,
            Self::I16 => reader.read_i16::<LittleEndian>()? as f64,
            Self::I32 => reader.read_i32::<LittleEndian>()? as f64,
            Self::F32 => reader.read_f32::<LittleEndian>()? as f64,
            Self::F64 => reader.read_f64::<LittleEndian>()?,
        })
    }

    fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

#[derive(Debug)]
struct NpyHeader {
    dtype: Dtype,
    fortran_order: bool,
    shape: Vec<usize>,
    /// Byte offset of the array data from the start of the file.
    data_offset: usize,
}

impl NpyHeader {
    fn element_count(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                SipsError::InvalidArray(format!("shape {:?} overflows", self.shape))
            })
    }
}

/// Read a stored 2D or 3D array as a `(height, width, frames)` buffer.
///
/// Values are cast into `T` the way a numeric cast does (truncation toward
/// zero, saturation). A 2D array becomes a single-frame buffer.
pub fn read_npy<T: Sample>(path: &Path) -> Result<Array3<T>> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let header = read_header(&mut reader, file_len)?;
    debug!(
        shape = ?header.shape,
        dtype = ?header.dtype,
        fortran = header.fortran_order,
        "Reading stored array"
    );

    let len = header.element_count()?;
    let available = file_len.saturating_sub(header.data_offset as u64);
    let needed = (len as u64).checked_mul(header.dtype.size() as u64);
    if needed.is_none_or(|bytes| bytes > available) {
        return Err(SipsError::InvalidArray(format!(
            "array data truncated: shape {:?} needs more than the {available} bytes present",
            header.shape
        )));
    }
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        let v = header.dtype.read_value(&mut reader).map_err(|e| {
            SipsError::InvalidArray(format!("array data truncated: {e}"))
        })?;
        values.push(T::from_f64_truncated(v));
    }

    let shape = IxDyn(&header.shape);
    let array = if header.fortran_order {
        ndarray::ArrayD::from_shape_vec(shape.f(), values)
    } else {
        ndarray::ArrayD::from_shape_vec(shape, values)
    }
    .map_err(|e| SipsError::InvalidArray(e.to_string()))?;

    match array.ndim() {
        2 => Ok(array
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(|e| SipsError::InvalidArray(e.to_string()))?
            .insert_axis(Axis(2))
            .as_standard_layout()
            .into_owned()),
        3 => Ok(array
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|e| SipsError::InvalidArray(e.to_string()))?
            .as_standard_layout()
            .into_owned()),
        n => Err(SipsError::InvalidArray(format!(
            "expected a 2D or 3D array, found {n} dimensions"
        ))),
    }
}

/// Write an array in C order as a version 1.0 `.npy` file.
pub fn write_npy<S, T, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = T>,
    T: Sample,
    D: Dimension,
{
    let mut writer = BufWriter::new(File::create(path)?);

    let shape = match array.shape() {
        [single] => format!("({single},)"),
        dims => format!(
            "({})",
            dims.iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let mut dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {shape}, }}",
        T::npy_descr()
    );
    // magic + version + u16 length + dict + '\n' must be 64-byte aligned
    let unpadded = NPY_MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    dict.push_str(&" ".repeat(padding));
    dict.push('\n');

    writer.write_all(NPY_MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&(dict.len() as u16).to_le_bytes())?;
    writer.write_all(dict.as_bytes())?;

    let mut buf = Vec::with_capacity(array.len() * std::mem::size_of::<T>());
    for &v in array.iter() {
        v.write_le(&mut buf);
    }
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Shape of a stored array without reading its data.
pub fn read_npy_shape(path: &Path) -> Result<Vec<usize>> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    Ok(read_header(&mut reader, file_len)?.shape)
}

fn read_header(reader: &mut impl Read, file_len: u64) -> Result<NpyHeader> {
    let mut magic = [0u8; 6];
    reader
        .read_exact(&mut magic)
        .map_err(|_| SipsError::InvalidArray("file too small for .npy header".into()))?;
    if &magic != NPY_MAGIC {
        return Err(SipsError::InvalidArray("missing NUMPY magic".into()));
    }

    let major = reader.read_u8()?;
    let _minor = reader.read_u8()?;
    let (header_len, prefix_len) = match major {
        1 => (reader.read_u16::<LittleEndian>()? as usize, 10),
        2 | 3 => (reader.read_u32::<LittleEndian>()? as usize, 12),
        v => {
            return Err(SipsError::InvalidArray(format!(
                "unsupported .npy version {v}"
            )))
        }
    };
    let data_offset = prefix_len + header_len;
    if data_offset as u64 > file_len {
        return Err(SipsError::InvalidArray(format!(
            "header length {header_len} exceeds file size {file_len}"
        )));
    }

    let mut dict = vec![0u8; header_len];
    reader.read_exact(&mut dict)?;
    let dict = String::from_utf8_lossy(&dict);
    Ok(NpyHeader {
        data_offset,
        ..parse_dict(&dict)?
    })
}

fn parse_dict(dict: &str) -> Result<NpyHeader> {
    let descr = dict_value(dict, "descr")?;
    let descr = descr
        .trim()
        .trim_start_matches(['\'', '"'])
        .split(['\'', '"'])
        .next()
        .unwrap_or_default();
    let dtype = Dtype::parse(descr)?;

    let fortran_order = dict_value(dict, "fortran_order")?.trim_start().starts_with("True");

    let shape_text = dict_value(dict, "shape")?;
    let open = shape_text
        .find('(')
        .ok_or_else(|| SipsError::InvalidArray("shape is not a tuple".into()))?;
    let close = shape_text
        .find(')')
        .ok_or_else(|| SipsError::InvalidArray("shape is not a tuple".into()))?;
    let shape = shape_text[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| SipsError::InvalidArray(format!("bad shape entry '{s}'")))
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok(NpyHeader {
        dtype,
        fortran_order,
        shape,
        data_offset: 0,
    })
}

/// Text following `'key':` in the header dictionary.
fn dict_value<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let pattern = format!("'{key}':");
    let start = dict
        .find(&pattern)
        .ok_or_else(|| SipsError::InvalidArray(format!("header has no '{key}' entry")))?;
    Ok(&dict[start + pattern.len()..])
}
