//! Saturating difference/ratio combination of consecutive frames.
//!
//! For a base frame and the `order` frames that follow it:
//! `d * Σ sat(base - next) + Σ sat(q * base / next)`, where `sat` clamps to
//! the 8-bit range `[0, 255]` and a zero divisor gives a ratio of 1.

use ndarray::{Array2, ArrayView2, ArrayView3, Axis, Zip};

use crate::consts::{NIELSEN_SATURATION_MAX, NIELSEN_SATURATION_MIN};
use crate::sample::Sample;

/// Clamp to `[0, 255]` whatever the working type.
#[inline]
pub fn saturate(value: f32) -> f32 {
    value.clamp(NIELSEN_SATURATION_MIN, NIELSEN_SATURATION_MAX)
}

/// `base / divisor`, or 1 where the divisor is zero.
#[inline]
pub fn safe_ratio(base: f32, divisor: f32) -> f32 {
    if divisor == 0.0 {
        1.0
    } else {
        base / divisor
    }
}

fn frame_f32<T: Sample>(stack: &ArrayView3<'_, T>, index: usize) -> Array2<f32> {
    stack.index_axis(Axis(2), index).mapv(|v| v.to_f64() as f32)
}

/// `Σ_{k=1..order} sat(frame[base] - frame[base + k])`.
pub fn sum_differences<T: Sample>(stack: &ArrayView3<'_, T>, base: usize, order: usize) -> Array2<f32> {
    let base_frame = frame_f32(stack, base);
    let mut sum = Array2::<f32>::zeros(base_frame.dim());
    for k in 1..=order {
        let other = frame_f32(stack, base + k);
        accumulate(&mut sum, &base_frame.view(), &other.view(), |b, o| saturate(b - o));
    }
    sum
}

/// `Σ_{k=1..order} sat(q * frame[base] / frame[base + k])`.
pub fn sum_ratios<T: Sample>(stack: &ArrayView3<'_, T>, base: usize, order: usize, q: f32) -> Array2<f32> {
    let base_frame = frame_f32(stack, base);
    let mut sum = Array2::<f32>::zeros(base_frame.dim());
    for k in 1..=order {
        let other = frame_f32(stack, base + k);
        accumulate(&mut sum, &base_frame.view(), &other.view(), |b, o| {
            saturate(q * safe_ratio(b, o))
        });
    }
    sum
}

fn accumulate(
    sum: &mut Array2<f32>,
    base: &ArrayView2<'_, f32>,
    other: &ArrayView2<'_, f32>,
    term: impl Fn(f32, f32) -> f32,
) {
    Zip::from(sum)
        .and(base)
        .and(other)
        .for_each(|s, &b, &o| *s += term(b, o));
}

/// `d * sum_differences + sum_ratios` over frames `base..=base + order`.
///
/// The caller guarantees `base + order` is a valid frame index.
pub fn nielsen_linear_comb<T: Sample>(
    stack: &ArrayView3<'_, T>,
    base: usize,
    order: usize,
    d: f32,
    q: f32,
) -> Array2<f32> {
    let differences = sum_differences(stack, base, order);
    let ratios = sum_ratios(stack, base, order, q);
    Zip::from(&differences)
        .and(&ratios)
        .map_collect(|&diff, &ratio| d * diff + ratio)
}
