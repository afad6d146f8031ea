use ndarray::{Array2, Zip};
use tracing::info;

use crate::error::Result;
use crate::io::loader::{load_series, LoadRequest};
use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::sample::Sample;
use crate::series::ImageSeries;

/// Per-pixel mean over the frame axis, computed in the sample type itself.
///
/// Integer samples sum with wrapping arithmetic and divide with truncation,
/// so the result matches a mean taken without a wider accumulator.
pub fn mean_frame<T: Sample>(series: &ImageSeries<T>) -> Array2<T> {
    let n = series.frame_count();
    let mut sum = Array2::<T>::zeros((series.height(), series.width()));

    for i in 0..n {
        Zip::from(&mut sum)
            .and(&series.frame(i))
            .for_each(|s, &v| *s = s.accumulate(v));
    }

    sum.mapv_inplace(|s| s.divide_count(n));
    sum
}

/// Load the requested range of a source and reduce it to one reference frame.
pub fn average_source<T: Sample>(
    request: &LoadRequest,
    reporter: &dyn ProgressReporter,
) -> Result<Array2<T>> {
    let series = load_series::<T>(request, reporter)?;

    reporter.begin_stage(PipelineStage::Averaging, Some(1));
    let mean = mean_frame(&series);
    reporter.advance();
    reporter.finish_stage();

    let (h, w, n) = series.dim();
    info!(width = w, height = h, frames = n, "Averaged reference frame");
    Ok(mean)
}
