use ndarray::Array2;

use super::bilinear_sample;

/// Scale a frame by `factor` about `(center_x, center_y)` keeping its size.
///
/// Each output pixel `p` samples the source at `c + (p - c) / factor`
/// with bilinear interpolation; samples outside the frame are zero.
pub fn zoom_frame(frame: &Array2<f32>, factor: f64, center_x: f64, center_y: f64) -> Array2<f32> {
    if factor <= 0.0 || factor == 1.0 {
        return frame.clone();
    }
    let view = frame.view();
    let inv = 1.0 / factor;
    Array2::from_shape_fn(frame.dim(), |(row, col)| {
        let src_x = center_x + (col as f64 - center_x) * inv;
        let src_y = center_y + (row as f64 - center_y) * inv;
        bilinear_sample(&view, src_y, src_x) as f32
    })
}

/// Default zoom centre of a frame: `(w / 2, h / 2)`, in pixels.
pub fn frame_centre(frame: &Array2<f32>) -> (f64, f64) {
    let (h, w) = frame.dim();
    ((w / 2) as f64, (h / 2) as f64)
}
