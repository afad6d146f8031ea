use std::sync::atomic::{AtomicUsize, Ordering};

/// Processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Averaging,
    Correcting,
    Rotating,
    Cropping,
    Processing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading frames"),
            Self::Averaging => write!(f, "Averaging reference"),
            Self::Correcting => write!(f, "Flat/dark correction"),
            Self::Rotating => write!(f, "Rotating"),
            Self::Cropping => write!(f, "Cropping"),
            Self::Processing => write!(f, "Processing frames"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One more work item within the current stage has completed.
    fn advance(&self) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores all updates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Atomic progress counter meant to be polled from another thread.
///
/// `count` increases by one per completed item and never decreases within a
/// stage; `percent` is the fraction of the announced total in `0.0..=100.0`.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub fn percent(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (100.0 * self.count() as f32 / total as f32).min(100.0)
    }
}

impl ProgressReporter for ProgressCounter {
    fn begin_stage(&self, _stage: PipelineStage, total_items: Option<usize>) {
        self.total.store(total_items.unwrap_or(0), Ordering::Release);
        self.done.store(0, Ordering::Release);
    }

    fn advance(&self) {
        self.done.fetch_add(1, Ordering::AcqRel);
    }
}
