use std::ops::Deref;

use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut2, Axis};

use crate::correction::correct_flat_dark;
use crate::error::{Result, SipsError};
use crate::geometry::crop::{crop_series, CropBounds};
use crate::geometry::rotate::rotate_series;
use crate::geometry::GeometryPlan;
use crate::pipeline::ProgressReporter;
use crate::sample::Sample;

/// An ordered stack of same-sized greyscale frames, indexed `(row, column, frame)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSeries<T: Sample> {
    data: Array3<T>,
}

impl<T: Sample> ImageSeries<T> {
    /// Wrap a `(height, width, frames)` array. All three dimensions must be non-zero.
    pub fn new(data: Array3<T>) -> Result<Self> {
        let (h, w, n) = data.dim();
        if h == 0 || w == 0 {
            return Err(SipsError::InvalidDimensions {
                width: w as u32,
                height: h as u32,
            });
        }
        if n == 0 {
            return Err(SipsError::EmptySequence);
        }
        Ok(Self { data })
    }

    /// Stack 2D frames along the frame axis.
    pub fn from_frames(frames: &[Array2<T>]) -> Result<Self> {
        let first = frames.first().ok_or(SipsError::EmptySequence)?;
        let (h, w) = first.dim();
        let mut data = Array3::<T>::zeros((h, w, frames.len()));
        for (i, frame) in frames.iter().enumerate() {
            if frame.dim() != (h, w) {
                return Err(SipsError::ShapeMismatch {
                    expected: (h, w),
                    actual: frame.dim(),
                });
            }
            data.index_axis_mut(Axis(2), i).assign(frame);
        }
        Self::new(data)
    }

    /// `(height, width, frame_count)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn frame_count(&self) -> usize {
        self.data.dim().2
    }

    /// View of a single frame. Panics if `index` is out of bounds.
    pub fn frame(&self, index: usize) -> ArrayView2<'_, T> {
        self.data.index_axis(Axis(2), index)
    }

    pub fn frame_checked(&self, index: usize) -> Result<ArrayView2<'_, T>> {
        let total = self.frame_count();
        if index >= total {
            return Err(SipsError::FrameIndexOutOfRange { index, total });
        }
        Ok(self.frame(index))
    }

    pub(crate) fn frame_mut(&mut self, index: usize) -> ArrayViewMut2<'_, T> {
        self.data.index_axis_mut(Axis(2), index)
    }

    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    /// Minimum and maximum sample value.
    pub fn value_range(&self) -> (f64, f64) {
        value_range(self.data.iter().copied())
    }
}

pub(crate) fn value_range<T: Sample>(values: impl Iterator<Item = T>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        let v = v.to_f64();
        (lo.min(v), hi.max(v))
    })
}

/// A series as loaded, before geometric preparation.
///
/// Flat/dark correction and rotation are only available here. Cropping
/// consumes the raw series and yields a [`PreparedSeries`], so a correction
/// can never be applied to an already cropped buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSeries<T: Sample> {
    series: ImageSeries<T>,
}

impl<T: Sample> RawSeries<T> {
    pub fn new(series: ImageSeries<T>) -> Self {
        Self { series }
    }

    pub fn from_array(data: Array3<T>) -> Result<Self> {
        Ok(Self::new(ImageSeries::new(data)?))
    }

    /// Divide every frame by the dark-subtracted flat field, in place.
    pub fn correct(
        &mut self,
        flat: &Array2<T>,
        dark: Option<&Array2<T>>,
        reporter: &dyn ProgressReporter,
    ) -> Result<()> {
        correct_flat_dark(&mut self.series, flat, dark, reporter)
    }

    /// Rotate every frame about its centre, counter-clockwise in degrees.
    pub fn rotate(&mut self, angle_degrees: f64, reporter: &dyn ProgressReporter) {
        rotate_series(&mut self.series, angle_degrees, reporter);
    }

    /// Crop every frame and finish preparation.
    pub fn crop(
        self,
        bounds: &CropBounds,
        reporter: &dyn ProgressReporter,
    ) -> Result<PreparedSeries<T>> {
        let cropped = crop_series(&self.series, bounds, reporter)?;
        Ok(PreparedSeries { series: cropped })
    }

    /// Rotate (if requested), then crop (if requested).
    pub fn prepare(
        mut self,
        plan: &GeometryPlan,
        reporter: &dyn ProgressReporter,
    ) -> Result<PreparedSeries<T>> {
        if plan.angle_degrees != 0.0 {
            self.rotate(plan.angle_degrees, reporter);
        }
        match &plan.crop {
            Some(bounds) => self.crop(bounds, reporter),
            None => Ok(self.into_prepared()),
        }
    }

    /// Use the full frame without any geometric change.
    pub fn into_prepared(self) -> PreparedSeries<T> {
        PreparedSeries {
            series: self.series,
        }
    }

    pub fn into_series(self) -> ImageSeries<T> {
        self.series
    }
}

impl<T: Sample> Deref for RawSeries<T> {
    type Target = ImageSeries<T>;

    fn deref(&self) -> &Self::Target {
        &self.series
    }
}

/// A read-only series ready for the frame pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedSeries<T: Sample> {
    series: ImageSeries<T>,
}

impl<T: Sample> PreparedSeries<T> {
    /// Treat an already prepared buffer (e.g. a previously exported array) as pipeline input.
    pub fn from_array(data: Array3<T>) -> Result<Self> {
        Ok(Self {
            series: ImageSeries::new(data)?,
        })
    }

    pub fn into_series(self) -> ImageSeries<T> {
        self.series
    }
}

impl<T: Sample> Deref for PreparedSeries<T> {
    type Target = ImageSeries<T>;

    fn deref(&self) -> &Self::Target {
        &self.series
    }
}
