pub mod crop;
pub mod resize;
pub mod rotate;
pub mod zoom;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::sample::Sample;

pub use crop::{crop_series, CropBounds};
pub use resize::resize_area;
pub use rotate::{rotate_frame, rotate_series};
pub use zoom::zoom_frame;

/// One-off geometric preparation of a raw series: rotation first, then crop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryPlan {
    /// Counter-clockwise rotation about the frame centre, in degrees.
    #[serde(default)]
    pub angle_degrees: f64,
    #[serde(default)]
    pub crop: Option<CropBounds>,
}

/// Bilinear interpolation with a zero background outside the frame.
///
/// Pixel centres sit on integer coordinates.
pub(crate) fn bilinear_sample<T: Sample>(data: &ArrayView2<'_, T>, y: f64, x: f64) -> f64 {
    let (h, w) = data.dim();

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let sample = |r: i64, c: i64| -> f64 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]].to_f64()
        } else {
            0.0
        }
    };

    let v00 = sample(y0, x0);
    let v10 = sample(y0, x1);
    let v01 = sample(y1, x0);
    let v11 = sample(y1, x1);

    v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy
}
