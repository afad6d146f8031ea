use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SipsError};
use crate::nielsen::{nielsen_linear_comb, safe_ratio};
use crate::sample::Sample;
use crate::series::ImageSeries;

/// How a displayed frame is derived from the series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonMode {
    /// Frame `i` as stored.
    #[default]
    Standard,
    /// `frame[i] - frame[0]`.
    DeltaTotal,
    /// `frame[i + order] - frame[i]`.
    DeltaNeighbour,
    /// `frame[i] / frame[0]`.
    RatioTotal,
    /// `frame[i + order] / frame[i]`.
    RatioNeighbour,
    /// Saturating difference/ratio combination over `frame[i..=i + order]`.
    NielsenCombo,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 6] = [
        Self::Standard,
        Self::DeltaTotal,
        Self::DeltaNeighbour,
        Self::RatioTotal,
        Self::RatioNeighbour,
        Self::NielsenCombo,
    ];

    /// Whether the mode looks `order` frames ahead.
    pub fn uses_neighbours(self) -> bool {
        matches!(
            self,
            Self::DeltaNeighbour | Self::RatioNeighbour | Self::NielsenCombo
        )
    }

    /// Number of frame indices the mode can render for a series of `frames`.
    pub fn effective_frame_count(self, frames: usize, order: usize) -> usize {
        if self.uses_neighbours() {
            frames.saturating_sub(order)
        } else {
            frames
        }
    }
}

impl TryFrom<u8> for ComparisonMode {
    type Error = SipsError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(SipsError::InvalidMode(value))
    }
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::DeltaTotal => write!(f, "Delta (total)"),
            Self::DeltaNeighbour => write!(f, "Delta (neighbour)"),
            Self::RatioTotal => write!(f, "Ratio (total)"),
            Self::RatioNeighbour => write!(f, "Ratio (neighbour)"),
            Self::NielsenCombo => write!(f, "Nielsen combination"),
        }
    }
}

/// Weights of the Nielsen combination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NielsenWeights {
    /// Scale of the summed differences.
    pub d: f32,
    /// Scale applied to each ratio before saturation.
    pub q: f32,
}

impl Default for NielsenWeights {
    fn default() -> Self {
        Self {
            d: crate::consts::DEFAULT_NIELSEN_DELTA_SCALE,
            q: crate::consts::DEFAULT_NIELSEN_RATIO_SCALE,
        }
    }
}

/// Derive the `f32` working frame for `index` under `mode`.
///
/// `index` must be below the mode's effective frame count, otherwise
/// `FrameIndexOutOfRange` is returned.
pub fn apply_pre_processing<T: Sample>(
    series: &ImageSeries<T>,
    mode: ComparisonMode,
    order: usize,
    weights: NielsenWeights,
    index: usize,
) -> Result<Array2<f32>> {
    let total = mode.effective_frame_count(series.frame_count(), order);
    if index >= total {
        return Err(SipsError::FrameIndexOutOfRange { index, total });
    }

    let frame = |i: usize| series.frame(i).mapv(|v| v.to_f64() as f32);

    let result = match mode {
        ComparisonMode::Standard => frame(index),
        ComparisonMode::DeltaTotal => frame(index) - frame(0),
        ComparisonMode::DeltaNeighbour => frame(index + order) - frame(index),
        ComparisonMode::RatioTotal => ratio(&frame(index), &frame(0)),
        ComparisonMode::RatioNeighbour => ratio(&frame(index + order), &frame(index)),
        ComparisonMode::NielsenCombo => {
            nielsen_linear_comb(&series.data().view(), index, order, weights.d, weights.q)
        }
    };
    Ok(result)
}

/// Elementwise `a / b`, with 1 wherever `b` is zero.
pub fn ratio(a: &Array2<f32>, b: &Array2<f32>) -> Array2<f32> {
    Zip::from(a).and(b).map_collect(|&a, &b| safe_ratio(a, b))
}
