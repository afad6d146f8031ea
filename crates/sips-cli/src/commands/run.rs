use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use sips_core::io::{LoadRequest, LoadTask};
use sips_core::pipeline::SessionConfig;
use sips_core::stack::average_source;
use sips_core::RawSeries;
use tracing::{debug, info};

use super::export::export_series;
use crate::progress::{bar_style, BarReporter};
use crate::summary::print_session_summary;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct RunArgs {
    /// Session config file (TOML)
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let session = SessionConfig::load(&args.config)
        .with_context(|| format!("Failed to read session {}", args.config.display()))?;
    print_session_summary(&session);

    let mut request = LoadRequest::new(&session.source.path, session.source.start, session.source.end);
    if let Some(ref ext) = session.source.extension {
        request = request.with_extension(ext);
    }

    // Load in the background while polling its counter.
    let task = LoadTask::<f32>::spawn(request)?;
    let progress = task.progress();
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());
    pb.set_message("Loading frames");
    while !task.is_finished() {
        pb.set_length(progress.total() as u64);
        pb.set_position(progress.count() as u64);
        std::thread::sleep(POLL_INTERVAL);
    }
    pb.set_length(progress.total() as u64);
    pb.set_position(progress.count() as u64);
    pb.finish_with_message("Loaded");
    let series = task
        .join()
        .with_context(|| format!("Failed to load {}", session.source.path.display()))?;

    info!(
        width = series.width(),
        height = series.height(),
        frames = series.frame_count(),
        "Source loaded"
    );

    let reporter = BarReporter::new();
    let mut raw = RawSeries::new(series);

    if let Some(ref refs) = session.references {
        let flat_request = LoadRequest::new(&refs.flat, refs.start, refs.end);
        let flat = average_source::<f32>(&flat_request, &reporter)
            .with_context(|| format!("Failed to average flat field {}", refs.flat.display()))?;
        let dark = match refs.dark {
            Some(ref dark_path) => {
                let dark_request = LoadRequest::new(dark_path, refs.start, refs.end);
                Some(
                    average_source::<f32>(&dark_request, &reporter).with_context(|| {
                        format!("Failed to average dark field {}", dark_path.display())
                    })?,
                )
            }
            None => None,
        };
        debug!(dark = dark.is_some(), "References averaged");
        raw.correct(&flat, dark.as_ref(), &reporter)
            .context("Flat/dark correction failed")?;
    }

    let prepared = raw
        .prepare(&session.geometry, &reporter)
        .context("Geometric preparation failed")?;

    let effective = session
        .processing
        .effective_frame_count(prepared.frame_count());
    let range = session
        .export
        .range
        .unwrap_or((0, effective.saturating_sub(1)));

    let written = export_series(
        &prepared,
        &session.processing,
        range,
        session.export.format,
        &session.export.output,
        session.export.fps,
        &reporter,
    )?;
    reporter.finish();

    println!(
        "\n{} frames exported to {}",
        written,
        session.export.output.display()
    );
    Ok(())
}
