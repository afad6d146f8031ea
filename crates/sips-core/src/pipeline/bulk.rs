use ndarray::{Array3, Axis};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, SipsError};
use crate::frame::ProcessedFrame;
use crate::sample::Sample;
use crate::series::PreparedSeries;

use super::config::ProcessingConfig;
use super::frame_pipeline::FramePipeline;
use super::sinks::FrameSink;
use super::types::{PipelineStage, ProgressReporter};

/// Check an inclusive frame range against the effective frame count.
///
/// A range that is reversed or reaches past the last frame is replaced by
/// the full range `0..=effective - 1`. With no renderable frames at all the
/// range cannot be repaired and `InvalidRange` is returned.
pub fn validate_range(start: usize, end: usize, effective: usize) -> Result<(usize, usize)> {
    if effective == 0 {
        return Err(SipsError::InvalidRange {
            start,
            end,
            available: 0,
        });
    }
    if start > end || end >= effective {
        warn!(
            start,
            end,
            available = effective,
            "Export range invalid, using full range"
        );
        return Ok((0, effective - 1));
    }
    Ok((start, end))
}

/// Render frames `start..=end` into one `(height, width, frames)` buffer.
///
/// The output geometry is that of the processed frames, so it differs from
/// the series when resizing. Frames are rendered in parallel.
pub fn materialize<T: Sample>(
    series: &PreparedSeries<T>,
    config: &ProcessingConfig,
    start: usize,
    end: usize,
    reporter: &dyn ProgressReporter,
) -> Result<Array3<f32>> {
    let pipeline = FramePipeline::new(series, config.clone());
    let (start, end) = validate_range(start, end, pipeline.effective_frame_count())?;
    let len = end - start + 1;
    info!(start, end, frames = len, mode = %config.mode, "Materializing frames");
    reporter.begin_stage(PipelineStage::Processing, Some(len));

    let first = pipeline.render_frame(start)?.to_f32();
    let (h, w) = first.dim();
    let mut buffer = Array3::<f32>::zeros((h, w, len));
    buffer.index_axis_mut(Axis(2), 0).assign(&first);
    reporter.advance();

    buffer
        .axis_iter_mut(Axis(2))
        .into_par_iter()
        .enumerate()
        .skip(1)
        .try_for_each(|(slot, mut out)| -> Result<()> {
            let frame = pipeline.render_frame(start + slot)?;
            out.assign(&frame.to_f32());
            reporter.advance();
            Ok(())
        })?;

    reporter.finish_stage();
    Ok(buffer)
}

/// [`materialize`] over every renderable frame.
pub fn materialize_all<T: Sample>(
    series: &PreparedSeries<T>,
    config: &ProcessingConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Array3<f32>> {
    let effective = config.effective_frame_count(series.frame_count());
    materialize(series, config, 0, effective.saturating_sub(1), reporter)
}

/// Render frames `start..=end` and hand them to `sink` in order.
///
/// Frames are rendered in parallel batches and written sequentially.
/// Returns the number of frames written.
pub fn export<T: Sample>(
    series: &PreparedSeries<T>,
    config: &ProcessingConfig,
    start: usize,
    end: usize,
    sink: &mut dyn FrameSink,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    let pipeline = FramePipeline::new(series, config.clone());
    let (start, end) = validate_range(start, end, pipeline.effective_frame_count())?;
    let len = end - start + 1;
    info!(start, end, frames = len, "Exporting frames");

    let first = pipeline.render_frame(start)?;
    let (h, w) = first.dim();
    sink.begin(len, h, w)?;

    reporter.begin_stage(PipelineStage::Writing, Some(len));
    sink.write_frame(start, &first)?;
    reporter.advance();

    let batch = rayon::current_num_threads().max(1);
    let indices: Vec<usize> = (start + 1..=end).collect();
    for chunk in indices.chunks(batch) {
        let frames: Vec<ProcessedFrame> = chunk
            .par_iter()
            .map(|&i| pipeline.render_frame(i))
            .collect::<Result<_>>()?;
        for (&i, frame) in chunk.iter().zip(&frames) {
            sink.write_frame(i, frame)?;
            reporter.advance();
        }
    }

    sink.finish()?;
    reporter.finish_stage();
    Ok(len)
}
