use ndarray::s;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SipsError};
use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::sample::Sample;
use crate::series::ImageSeries;

/// Rectangular crop window in pixel coordinates, half-open on the right/bottom:
/// rows `y_top..y_bottom`, columns `x_left..x_right`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBounds {
    pub x_left: usize,
    pub x_right: usize,
    pub y_top: usize,
    pub y_bottom: usize,
}

impl CropBounds {
    pub fn new(x_left: usize, x_right: usize, y_top: usize, y_bottom: usize) -> Self {
        Self {
            x_left,
            x_right,
            y_top,
            y_bottom,
        }
    }

    pub fn width(&self) -> usize {
        self.x_right.saturating_sub(self.x_left)
    }

    pub fn height(&self) -> usize {
        self.y_bottom.saturating_sub(self.y_top)
    }

    /// Bounds are not clamped: a window that is empty or leaves the frame is
    /// reported back to the caller.
    pub fn check(&self, src_w: usize, src_h: usize) -> Result<()> {
        if self.width() == 0 || self.height() == 0 {
            return Err(SipsError::InvalidCrop(format!(
                "empty crop window x {}..{}, y {}..{}",
                self.x_left, self.x_right, self.y_top, self.y_bottom
            )));
        }
        if self.x_right > src_w || self.y_bottom > src_h {
            return Err(SipsError::InvalidCrop(format!(
                "crop window x {}..{}, y {}..{} exceeds frame size {src_w}x{src_h}",
                self.x_left, self.x_right, self.y_top, self.y_bottom
            )));
        }
        Ok(())
    }
}

/// Crop every frame of a series to the same window.
pub fn crop_series<T: Sample>(
    series: &ImageSeries<T>,
    bounds: &CropBounds,
    reporter: &dyn ProgressReporter,
) -> Result<ImageSeries<T>> {
    bounds.check(series.width(), series.height())?;
    reporter.begin_stage(PipelineStage::Cropping, Some(1));
    info!(
        x_left = bounds.x_left,
        x_right = bounds.x_right,
        y_top = bounds.y_top,
        y_bottom = bounds.y_bottom,
        "Cropping series"
    );
    let view = series.data().slice(s![
        bounds.y_top..bounds.y_bottom,
        bounds.x_left..bounds.x_right,
        ..
    ]);
    let cropped = ImageSeries::new(view.to_owned())?;
    reporter.advance();
    reporter.finish_stage();
    Ok(cropped)
}
