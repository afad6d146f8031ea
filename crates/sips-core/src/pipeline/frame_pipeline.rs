use ndarray::Array2;
use tracing::{debug, warn};

use crate::consts::DEFAULT_FRAME_INDEX;
use crate::error::{Result, SipsError};
use crate::filters::{clahe, clip_percentile, fast_nl_means, gaussian_blur};
use crate::frame::ProcessedFrame;
use crate::geometry::resize::resize_area;
use crate::geometry::zoom::{frame_centre, zoom_frame};
use crate::modes::apply_pre_processing;
use crate::sample::Sample;
use crate::series::PreparedSeries;

use super::config::{ProcessingConfig, ViewConfig};

/// Renders processed frames of a prepared series under one [`ProcessingConfig`].
///
/// Holds the current frame index for step-wise navigation; rendering itself
/// only reads the series.
pub struct FramePipeline<'a, T: Sample> {
    series: &'a PreparedSeries<T>,
    config: ProcessingConfig,
    index: usize,
}

impl<'a, T: Sample> FramePipeline<'a, T> {
    pub fn new(series: &'a PreparedSeries<T>, config: ProcessingConfig) -> Self {
        Self {
            series,
            config,
            index: DEFAULT_FRAME_INDEX,
        }
    }

    pub fn series(&self) -> &PreparedSeries<T> {
        self.series
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Replace the config. The current index falls back to the default when
    /// it is no longer below the effective frame count.
    pub fn set_config(&mut self, config: ProcessingConfig) {
        self.config = config;
        if self.index >= self.effective_frame_count() {
            debug!(
                index = self.index,
                effective = self.effective_frame_count(),
                "Frame index reset after config change"
            );
            self.index = DEFAULT_FRAME_INDEX;
        }
    }

    /// `N` for the single-frame modes, `N - order` for the neighbour modes.
    pub fn effective_frame_count(&self) -> usize {
        self.config
            .effective_frame_count(self.series.frame_count())
    }

    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn set_frame_index(&mut self, index: usize) -> Result<()> {
        let total = self.effective_frame_count();
        if index >= total {
            return Err(SipsError::FrameIndexOutOfRange { index, total });
        }
        self.index = index;
        Ok(())
    }

    /// Advance one frame, wrapping to the first after the last.
    pub fn next_frame(&mut self) -> usize {
        let total = self.effective_frame_count();
        self.index = if total == 0 || self.index + 1 >= total {
            0
        } else {
            self.index + 1
        };
        self.index
    }

    /// Step back one frame, wrapping to the last before the first.
    pub fn previous_frame(&mut self) -> usize {
        let total = self.effective_frame_count();
        self.index = if total == 0 {
            0
        } else if self.index == 0 || self.index >= total {
            total - 1
        } else {
            self.index - 1
        };
        self.index
    }

    /// Render the current frame.
    pub fn render(&self) -> Result<ProcessedFrame> {
        self.render_frame(self.index)
    }

    /// Mode selection, enhancement chain, then resize/zoom for one frame index.
    pub fn render_frame(&self, index: usize) -> Result<ProcessedFrame> {
        let effective = self.effective_frame_count();
        if effective == 0 {
            warn!(
                order = self.config.order(),
                frames = self.series.frame_count(),
                "Neighbour order leaves no frames to render"
            );
            return Err(SipsError::InvalidRange {
                start: index,
                end: index,
                available: 0,
            });
        }

        let selected = apply_pre_processing(
            self.series,
            self.config.mode,
            self.config.order(),
            self.config.nielsen,
            index,
        )?;
        let enhanced = apply_enhancements(selected, &self.config);
        Ok(apply_view(enhanced, &self.config.view))
    }
}

/// Run the enabled enhancement stages in their fixed order:
/// clip, gaussian, non-local-means, CLAHE.
pub fn apply_enhancements(frame: Array2<f32>, config: &ProcessingConfig) -> ProcessedFrame {
    let mut frame = frame;

    if config.clip.enabled {
        debug!(
            min = config.clip.min_percentile,
            max = config.clip.max_percentile,
            "Clipping"
        );
        frame = clip_percentile(&frame, config.clip.min_percentile, config.clip.max_percentile);
    }

    if config.gaussian.enabled {
        debug!(sigma = config.gaussian.sigma, "Gaussian smoothing");
        frame = gaussian_blur(&frame, config.gaussian.sigma);
    }

    let mut current = ProcessedFrame::Float32(frame);

    if config.denoise.enabled {
        let h = config.denoise.strength();
        debug!(
            strength = h,
            template = config.denoise.template_window,
            search = config.denoise.search_window,
            "Non-local-means denoising"
        );
        let data = current.into_u16();
        current = ProcessedFrame::Uint16(fast_nl_means(
            &data,
            h,
            config.denoise.template_window,
            config.denoise.search_window,
        ));
    }

    if config.clahe.enabled {
        debug!(
            clip_limit = config.clahe.clip_limit,
            tile_grid = config.clahe.tile_grid,
            "CLAHE"
        );
        let data = current.into_u16();
        current = ProcessedFrame::Uint16(clahe(
            &data,
            config.clahe.clip_limit,
            config.clahe.tile_grid,
        ));
    }

    current
}

/// Resize, then zoom about the configured (or central) point.
///
/// Non-positive or unit factors leave the frame untouched.
pub fn apply_view(frame: ProcessedFrame, view: &ViewConfig) -> ProcessedFrame {
    let mut frame = frame;

    if view.resize_factor > 0.0 && view.resize_factor != 1.0 {
        frame = map_f32(frame, |data| resize_area(data, view.resize_factor));
    }

    if view.zoom_factor > 0.0 && view.zoom_factor != 1.0 {
        frame = map_f32(frame, |data| {
            let (cx, cy) = view.zoom_center.unwrap_or_else(|| frame_centre(data));
            zoom_frame(data, view.zoom_factor, cx, cy)
        });
    }

    frame
}

/// Apply a float operation while keeping the frame's working type.
fn map_f32(frame: ProcessedFrame, op: impl Fn(&Array2<f32>) -> Array2<f32>) -> ProcessedFrame {
    match frame {
        ProcessedFrame::Float32(data) => ProcessedFrame::Float32(op(&data)),
        ProcessedFrame::Uint16(data) => {
            let result = op(&data.mapv(|v| v as f32));
            ProcessedFrame::Uint16(result.mapv(|v| u16::from_f64_rounded(v as f64)))
        }
    }
}
