use ndarray::{Array2, Zip};
use tracing::info;

use crate::error::{Result, SipsError};
use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::sample::Sample;
use crate::series::ImageSeries;

/// Flat/dark field correction of every frame, in place.
///
/// `corrected = (frame - dark) / (flat - dark)`. Wherever `flat == dark` the
/// result is exactly `1`, whatever the frame value, so dead or saturated
/// reference pixels come out neutral instead of as inf/NaN. A missing dark
/// field counts as all zero.
pub fn correct_flat_dark<T: Sample>(
    series: &mut ImageSeries<T>,
    flat: &Array2<T>,
    dark: Option<&Array2<T>>,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let expected = (series.height(), series.width());
    check_shape(expected, flat.dim())?;
    if let Some(dark) = dark {
        check_shape(expected, dark.dim())?;
    }

    let dark = match dark {
        Some(d) => d.mapv(|v| v.to_f64()),
        None => Array2::<f64>::zeros(expected),
    };
    let denom = Zip::from(flat)
        .and(&dark)
        .map_collect(|&f, &d| f.to_f64() - d);

    let total = series.frame_count();
    info!(frames = total, "Applying flat/dark correction");
    reporter.begin_stage(PipelineStage::Correcting, Some(total));

    for i in 0..total {
        let mut frame = series.frame_mut(i);
        Zip::from(&mut frame)
            .and(&dark)
            .and(&denom)
            .for_each(|px, &d, &den| {
                let corrected = if den == 0.0 {
                    1.0
                } else {
                    (px.to_f64() - d) / den
                };
                *px = T::from_f64_truncated(corrected);
            });
        reporter.advance();
    }

    reporter.finish_stage();
    Ok(())
}

fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(SipsError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
