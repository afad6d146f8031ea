use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sips_core::io::probe;

#[derive(Args)]
pub struct InfoArgs {
    /// Cine container, .npy array, or directory of TIFF frames
    pub source: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = probe(&args.source)
        .with_context(|| format!("Failed to read {}", args.source.display()))?;

    println!("Source:      {}", info.path.display());
    println!("Kind:        {}", info.kind);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    if info.bit_depth > 0 {
        println!("Bit depth:   {}", info.bit_depth);
    }

    let bytes_per_sample = if info.bit_depth > 8 { 2 } else { 1 };
    let total_mb = (info.width as usize * info.height as usize * bytes_per_sample * info.total_frames)
        as f64
        / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);

    Ok(())
}
