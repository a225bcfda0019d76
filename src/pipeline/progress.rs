use crate::foundation::core::Stage;

/// Progress report delivered at pipeline checkpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    /// Stage the checkpoint belongs to.
    pub stage: Stage,
    /// Overall completion in `[0.0, 1.0]`. Never decreases within a job.
    pub fraction: f64,
    /// Completion of `stage` alone in `[0.0, 1.0]`.
    pub stage_fraction: f64,
    /// Human-readable status line.
    pub message: String,
}

/// Receiver for [`Progress`] reports. Called synchronously on the pipeline thread.
pub trait ProgressReporter {
    fn report(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressReporter for F {
    fn report(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Reporter that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _progress: &Progress) {}
}

/// Maps per-stage fractions onto the overall scale and keeps it monotone.
pub(crate) struct ProgressTracker<'r, R: ProgressReporter + ?Sized> {
    reporter: &'r mut R,
    last: f64,
}

impl<'r, R: ProgressReporter + ?Sized> ProgressTracker<'r, R> {
    pub(crate) fn new(reporter: &'r mut R) -> Self {
        Self {
            reporter,
            last: 0.0,
        }
    }

    pub(crate) fn emit(&mut self, stage: Stage, stage_fraction: f64, message: impl Into<String>) {
        let stage_fraction = if stage_fraction.is_finite() {
            stage_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (lo, hi) = stage.progress_span();
        let fraction = (lo + (hi - lo) * stage_fraction).max(self.last);
        self.last = fraction;

        let progress = Progress {
            stage,
            fraction,
            stage_fraction,
            message: message.into(),
        };
        tracing::trace!(%stage, fraction, message = %progress.message, "progress");
        self.reporter.report(&progress);
    }

    pub(crate) fn last(&self) -> f64 {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/progress.rs"]
mod tests;
