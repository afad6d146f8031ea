use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use sips_core::consts::{DEFAULT_REFERENCE_END, DEFAULT_REFERENCE_START};
use sips_core::io::{write_npy, LoadRequest};
use sips_core::stack::average_source;
use sips_core::Sample;

use crate::progress::BarReporter;

#[derive(Clone, Copy, ValueEnum)]
pub enum SampleArg {
    Uint8,
    Uint16,
    Float32,
    Float64,
}

#[derive(Args)]
pub struct AverageArgs {
    /// Cine container, .npy array, or directory of frames
    pub source: PathBuf,

    /// First frame of the range
    #[arg(long, default_value_t = DEFAULT_REFERENCE_START)]
    pub start: usize,

    /// Last frame of the range (inclusive)
    #[arg(long, default_value_t = DEFAULT_REFERENCE_END)]
    pub end: usize,

    /// Frame file extension for image directories
    #[arg(long)]
    pub extension: Option<String>,

    /// Sample type the mean is computed in
    #[arg(long, value_enum, default_value = "uint16")]
    pub dtype: SampleArg,

    /// Output .npy file
    #[arg(short, long, default_value = "reference.npy")]
    pub output: PathBuf,
}

pub fn run(args: &AverageArgs) -> Result<()> {
    let mut request = LoadRequest::new(&args.source, args.start, args.end);
    if let Some(ref ext) = args.extension {
        request = request.with_extension(ext);
    }

    match args.dtype {
        SampleArg::Uint8 => average_to::<u8>(&request, &args.output),
        SampleArg::Uint16 => average_to::<u16>(&request, &args.output),
        SampleArg::Float32 => average_to::<f32>(&request, &args.output),
        SampleArg::Float64 => average_to::<f64>(&request, &args.output),
    }
}

fn average_to<T: Sample>(request: &LoadRequest, output: &Path) -> Result<()> {
    let reporter = BarReporter::new();
    let mean = average_source::<T>(request, &reporter)
        .with_context(|| format!("Failed to average {}", request.path.display()))?;
    reporter.finish();

    write_npy(output, &mean)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let (h, w) = mean.dim();
    println!(
        "Reference {}x{} ({}) saved to {}",
        w,
        h,
        T::KIND,
        output.display()
    );
    Ok(())
}
