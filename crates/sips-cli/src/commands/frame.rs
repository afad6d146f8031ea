use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sips_core::consts::{DEFAULT_LOAD_END, DEFAULT_LOAD_START};
use sips_core::io::image_io::save_tiff_u16;
use sips_core::io::{load_series, LoadRequest};
use sips_core::pipeline::{FramePipeline, NoOpReporter};
use sips_core::RawSeries;

use super::ProcessingArgs;

#[derive(Args)]
pub struct FrameArgs {
    /// Source holding an already corrected and cropped series
    pub source: PathBuf,

    /// First source frame to load
    #[arg(long, default_value_t = DEFAULT_LOAD_START)]
    pub load_start: usize,

    /// Last source frame to load (inclusive)
    #[arg(long, default_value_t = DEFAULT_LOAD_END)]
    pub load_end: usize,

    /// Frame index within the loaded series
    #[arg(long, default_value = "0")]
    pub index: usize,

    #[command(flatten)]
    pub processing: ProcessingArgs,

    /// Output TIFF path
    #[arg(short, long, default_value = "frame.tif")]
    pub output: PathBuf,
}

pub fn run(args: &FrameArgs) -> Result<()> {
    let config = args.processing.to_config()?;
    let request = LoadRequest::new(&args.source, args.load_start, args.load_end);
    let series = load_series::<f32>(&request, &NoOpReporter)
        .with_context(|| format!("Failed to load {}", args.source.display()))?;
    let prepared = RawSeries::new(series).into_prepared();

    let mut pipeline = FramePipeline::new(&prepared, config);
    pipeline
        .set_frame_index(args.index)
        .with_context(|| format!("Frame {} cannot be rendered", args.index))?;
    let frame = pipeline.render()?;

    let (h, w) = frame.dim();
    save_tiff_u16(&frame.into_u16(), &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Frame {} ({}x{}, {}) saved to {}",
        args.index,
        w,
        h,
        pipeline.config().mode,
        args.output.display()
    );
    Ok(())
}
