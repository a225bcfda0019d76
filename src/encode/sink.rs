use image::RgbImage;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming frames in timeline order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values,
/// starting at 0, with no gaps. After a failure the caller invokes `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one RGB8 frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
    /// Discard anything partially written. Must be safe to call at any point.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    retain: bool,
    frames: Vec<(FrameIndex, RgbImage)>,
    frame_count: u64,
    resolutions_seen: Vec<(u32, u32)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Sink that keeps a copy of every frame.
    pub fn new() -> Self {
        Self {
            retain: true,
            ..Self::default()
        }
    }

    /// Sink that only counts frames and records resolutions.
    pub fn counting() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Retained frames in timeline order (empty for counting sinks).
    pub fn frames(&self) -> &[(FrameIndex, RgbImage)] {
        &self.frames
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Distinct frame resolutions observed, in first-seen order.
    pub fn resolutions_seen(&self) -> &[(u32, u32)] {
        &self.resolutions_seen
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.frame_count = 0;
        self.resolutions_seen.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(ReelError::encoding("in-memory sink not started"));
        }
        if idx.0 != self.frame_count {
            return Err(ReelError::encoding(format!(
                "expected frame {}, got {}",
                self.frame_count, idx.0
            )));
        }
        let dims = frame.dimensions();
        if !self.resolutions_seen.contains(&dims) {
            self.resolutions_seen.push(dims);
        }
        if self.retain {
            self.frames.push((idx, frame.clone()));
        }
        self.frame_count += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
