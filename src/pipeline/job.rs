use std::path::{Path, PathBuf};

use crate::{
    assets::decode::ImageSource,
    config::ReelConfig,
    effects::transitions::TransitionSet,
    foundation::error::{ReelError, ReelResult},
    pipeline::cancel::CancelToken,
};

/// Seconds each image stays on screen when a job does not say otherwise.
pub const DEFAULT_STILL_SECS: f64 = 4.0;

/// One reel to render: ordered sources, timing, transition selection and destination.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub sources: Vec<ImageSource>,
    /// On-screen time of every image.
    pub still_duration_secs: f64,
    /// Kinds assigned round-robin in source order.
    pub transitions: TransitionSet,
    /// Final MP4 location. Only written once encoding has succeeded.
    pub output: PathBuf,
    pub cancel: CancelToken,
}

impl RenderJob {
    pub fn new(sources: impl IntoIterator<Item = ImageSource>, output: impl Into<PathBuf>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            still_duration_secs: DEFAULT_STILL_SECS,
            transitions: TransitionSet::all(),
            output: output.into(),
            cancel: CancelToken::new(),
        }
    }

    /// Job over image files.
    pub fn from_paths<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            paths.into_iter().map(|p| ImageSource::path(p.as_ref())),
            output,
        )
    }

    pub fn with_still_duration(mut self, secs: f64) -> Self {
        self.still_duration_secs = secs;
        self
    }

    pub fn with_transitions(mut self, transitions: TransitionSet) -> Self {
        self.transitions = transitions;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Check the job against `cfg` before any work starts.
    pub fn validate(&self, cfg: &ReelConfig) -> ReelResult<()> {
        if self.sources.is_empty() {
            return Err(ReelError::validation("job needs at least one image"));
        }
        if self.sources.len() > cfg.max_images {
            return Err(ReelError::validation(format!(
                "job has {} images, at most {} are allowed",
                self.sources.len(),
                cfg.max_images
            )));
        }
        let secs = self.still_duration_secs;
        if !secs.is_finite() || secs < cfg.min_still_secs || secs > cfg.max_still_secs {
            return Err(ReelError::invalid_duration(format!(
                "still duration {secs}s is outside [{}, {}]",
                cfg.min_still_secs, cfg.max_still_secs
            )));
        }
        if self.transitions.is_empty() {
            return Err(ReelError::validation(
                "at least one transition must be enabled",
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ReelError::validation("output path must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
