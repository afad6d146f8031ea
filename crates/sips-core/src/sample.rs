use std::fmt::Debug;

use num_traits::{Bounded, Zero};
use serde::{Deserialize, Serialize};

/// Element type of a series buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    U8,
    U16,
    F32,
    F64,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "uint8"),
            Self::U16 => write!(f, "uint16"),
            Self::F32 => write!(f, "float32"),
            Self::F64 => write!(f, "float64"),
        }
    }
}

/// A numeric sample kind a series can be stored in.
///
/// Conversions go through `f64`. The two narrowing conversions mirror the two
/// cast conventions used across the pipeline: `from_f64_truncated` is a plain
/// numeric cast (truncate toward zero, saturate, NaN to zero), while
/// `from_f64_rounded` rounds half to even before saturating and is used by the
/// interpolating geometry operations.
pub trait Sample:
    Copy + Clone + Send + Sync + PartialOrd + Debug + Default + Zero + Bounded + 'static
{
    const KIND: SampleKind;

    fn to_f64(self) -> f64;

    fn from_f64_truncated(v: f64) -> Self;

    fn from_f64_rounded(v: f64) -> Self;

    /// Add without widening. Integer kinds wrap on overflow.
    fn accumulate(self, other: Self) -> Self;

    /// Divide by a frame count in the sample's own arithmetic.
    fn divide_count(self, count: usize) -> Self;

    /// Little-endian `.npy` type descriptor.
    fn npy_descr() -> &'static str;

    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_integer_sample {
    ($t:ty, $kind:expr, $descr:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = $kind;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64_truncated(v: f64) -> Self {
                // `as` truncates toward zero, saturates, and maps NaN to 0.
                v as $t
            }

            #[inline]
            fn from_f64_rounded(v: f64) -> Self {
                v.round_ties_even() as $t
            }

            #[inline]
            fn accumulate(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            #[inline]
            fn divide_count(self, count: usize) -> Self {
                if count == 0 {
                    return 0;
                }
                (self as f64 / count as f64) as $t
            }

            fn npy_descr() -> &'static str {
                $descr
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

macro_rules! impl_float_sample {
    ($t:ty, $kind:expr, $descr:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = $kind;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64_truncated(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_f64_rounded(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn accumulate(self, other: Self) -> Self {
                self + other
            }

            #[inline]
            fn divide_count(self, count: usize) -> Self {
                self / count as $t
            }

            fn npy_descr() -> &'static str {
                $descr
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_integer_sample!(u8, SampleKind::U8, "|u1");
impl_integer_sample!(u16, SampleKind::U16, "<u2");
impl_float_sample!(f32, SampleKind::F32, "<f4");
impl_float_sample!(f64, SampleKind::F64, "<f8");
