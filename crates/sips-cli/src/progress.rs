use indicatif::{ProgressBar, ProgressStyle};
use sips_core::pipeline::{PipelineStage, ProgressReporter};

/// Drives one terminal progress bar from pipeline stage updates.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style());
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg:24} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self) {
        self.bar.inc(1);
    }
}
