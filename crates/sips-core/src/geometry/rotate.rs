use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView2, Axis};
use tracing::info;

use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::sample::Sample;
use crate::series::ImageSeries;

use super::bilinear_sample;

/// Rotate a frame about its geometric centre `(w/2, h/2)`.
///
/// Positive angles rotate counter-clockwise as displayed (rows growing
/// downward). Output has the input size; uncovered pixels are zero.
pub fn rotate_frame<T: Sample>(frame: ArrayView2<'_, T>, angle_degrees: f64) -> Array2<T> {
    let (h, w) = frame.dim();
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    Array2::from_shape_fn((h, w), |(row, col)| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        let src_x = cx + cos * dx - sin * dy;
        let src_y = cy + sin * dx + cos * dy;
        T::from_f64_rounded(bilinear_sample(&frame, src_y, src_x))
    })
}

/// Rotate every frame of a series in place.
pub fn rotate_series<T: Sample>(
    series: &mut ImageSeries<T>,
    angle_degrees: f64,
    reporter: &dyn ProgressReporter,
) {
    let total = series.frame_count();
    info!(frames = total, angle = angle_degrees, "Rotating series");
    reporter.begin_stage(PipelineStage::Rotating, Some(total));

    series
        .data_mut()
        .axis_iter_mut(Axis(2))
        .into_par_iter()
        .for_each(|mut frame| {
            let rotated = rotate_frame(frame.view(), angle_degrees);
            frame.assign(&rotated);
            reporter.advance();
        });

    reporter.finish_stage();
}
