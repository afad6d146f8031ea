use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use sips_core::consts::{DEFAULT_LOAD_END, DEFAULT_LOAD_START, DEFAULT_VIDEO_FPS};
use sips_core::io::{load_series, LoadRequest};
use sips_core::pipeline::{
    export, ArraySink, ExportFormat, FrameSink, ProcessingConfig, TiffSequenceSink, VideoSink,
};
use sips_core::{PreparedSeries, RawSeries, Sample};

use super::ProcessingArgs;
use crate::progress::BarReporter;
use crate::summary::print_export_summary;

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Tiff,
    Video,
    Npy,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Tiff => Self::Tiff,
            FormatArg::Video => Self::Video,
            FormatArg::Npy => Self::Npy,
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Source holding an already corrected and cropped series
    pub source: PathBuf,

    /// First source frame to load
    #[arg(long, default_value_t = DEFAULT_LOAD_START)]
    pub load_start: usize,

    /// Last source frame to load (inclusive)
    #[arg(long, default_value_t = DEFAULT_LOAD_END)]
    pub load_end: usize,

    /// First exported frame; the full range is used when the range is invalid
    #[arg(long)]
    pub from: Option<usize>,

    /// Last exported frame (inclusive)
    #[arg(long)]
    pub to: Option<usize>,

    /// Output container
    #[arg(long, value_enum, default_value = "tiff")]
    pub format: FormatArg,

    /// Frame rate of video output
    #[arg(long, default_value_t = DEFAULT_VIDEO_FPS)]
    pub fps: u32,

    #[command(flatten)]
    pub processing: ProcessingArgs,

    /// Output directory (tiff) or file (video .gif, npy)
    #[arg(short, long, default_value = "export")]
    pub output: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let config = args.processing.to_config()?;
    let request = LoadRequest::new(&args.source, args.load_start, args.load_end);

    let reporter = BarReporter::new();
    let series = load_series::<f32>(&request, &reporter)
        .with_context(|| format!("Failed to load {}", args.source.display()))?;
    let prepared = RawSeries::new(series).into_prepared();

    let format = ExportFormat::from(args.format);
    let effective = config.effective_frame_count(prepared.frame_count());
    let range = (
        args.from.unwrap_or(0),
        args.to.unwrap_or(effective.saturating_sub(1)),
    );
    print_export_summary(&args.source, &args.output, format, range, &config);

    let written = export_series(&prepared, &config, range, format, &args.output, args.fps, &reporter)?;
    reporter.finish();
    println!("\n{} frames exported to {}", written, args.output.display());
    Ok(())
}

/// Export a prepared series through the sink matching `format`.
pub fn export_series<T: Sample>(
    series: &PreparedSeries<T>,
    config: &ProcessingConfig,
    range: (usize, usize),
    format: ExportFormat,
    output: &Path,
    fps: u32,
    reporter: &BarReporter,
) -> Result<usize> {
    let mut sink: Box<dyn FrameSink> = match format {
        ExportFormat::Tiff => Box::new(TiffSequenceSink::new(output)),
        ExportFormat::Video => Box::new(VideoSink::new(output, fps)),
        ExportFormat::Npy => Box::new(ArraySink::new(output)),
    };
    export(series, config, range.0, range.1, sink.as_mut(), reporter)
        .with_context(|| format!("Failed to export to {}", output.display()))
}
