use ndarray::{Array, Array2, ArrayBase, Data, Dimension};

use crate::consts::{U16_FULL_SCALE, U8_FULL_SCALE};
use crate::sample::Sample;
use crate::series::value_range;

/// Rescale `image` from `[in_min, in_max]` onto `[out_min, out_max]` in sample type `O`.
///
/// Missing input bounds are taken from the image itself. A degenerate input
/// range (`in_min == in_max`, e.g. a constant image) yields an all-zero buffer.
/// Otherwise every sample goes through `out = a * in + b` with
/// `a = (out_max - out_min) / (in_max - in_min)` and `b = out_max - a * in_max`,
/// then is cast into `O` by truncation with saturation.
pub fn convert<S, T, O, D>(
    image: &ArrayBase<S, D>,
    in_min: Option<f64>,
    in_max: Option<f64>,
    out_min: f64,
    out_max: f64,
) -> Array<O, D>
where
    S: Data<Elem = T>,
    T: Sample,
    O: Sample,
    D: Dimension,
{
    if image.is_empty() {
        return Array::<O, D>::zeros(image.raw_dim());
    }

    let (lo, hi) = match (in_min, in_max) {
        (Some(lo), Some(hi)) => (lo, hi),
        (lo, hi) => {
            let (actual_lo, actual_hi) = value_range(image.iter().copied());
            (lo.unwrap_or(actual_lo), hi.unwrap_or(actual_hi))
        }
    };

    if lo == hi {
        return Array::<O, D>::zeros(image.raw_dim());
    }

    let a = (out_max - out_min) / (hi - lo);
    let b = out_max - a * hi;
    image.mapv(|v| O::from_f64_truncated(a * v.to_f64() + b))
}

/// Full-range conversion to 16-bit unsigned, using the image's own min/max.
pub fn convert_to_u16<S, T>(image: &ArrayBase<S, ndarray::Ix2>) -> Array2<u16>
where
    S: Data<Elem = T>,
    T: Sample,
{
    convert(image, None, None, 0.0, U16_FULL_SCALE)
}

/// Full-range conversion to 8-bit unsigned, using the image's own min/max.
pub fn convert_to_u8<S, T>(image: &ArrayBase<S, ndarray::Ix2>) -> Array2<u8>
where
    S: Data<Elem = T>,
    T: Sample,
{
    convert(image, None, None, 0.0, U8_FULL_SCALE)
}
