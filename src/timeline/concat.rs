use crate::{
    effects::clip::Clip,
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{Canvas, Fps, FrameIndex, Stage},
        error::{ReelError, ReelResult},
    },
    pipeline::cancel::CancelToken,
    process::processor::ItemProgress,
};

/// Counters for one concatenation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimelineStats {
    pub clips: usize,
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_elided: u64,
}

/// Clips in presentation order at one canvas size and one frame rate.
#[derive(Clone, Debug)]
pub struct Timeline {
    canvas: Canvas,
    fps: Fps,
    clips: Vec<Clip>,
}

impl Timeline {
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            clips: Vec::new(),
        }
    }

    pub fn push(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Sum of clip frame counts.
    pub fn total_frames(&self) -> u64 {
        self.clips.iter().map(Clip::frame_count).sum()
    }

    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames())
    }

    /// Stream every clip's frames into `sink` back to back.
    ///
    /// Frame indices are global and strictly increasing. The token is checked before each clip;
    /// each clip is released once its frames are written. On any failure the sink is aborted
    /// instead of ended.
    #[tracing::instrument(skip_all, fields(clips = self.clips.len(), canvas = %self.canvas))]
    pub fn concatenate<S: FrameSink + ?Sized>(
        self,
        sink: &mut S,
        cancel: &CancelToken,
        on_clip: impl FnMut(ItemProgress),
    ) -> ReelResult<TimelineStats> {
        if self.clips.is_empty() {
            return Err(ReelError::validation("timeline has no clips"));
        }
        let (width, height) = self.canvas.dims();
        sink.begin(SinkConfig {
            width,
            height,
            fps: self.fps,
        })
        .inspect_err(|_| sink.abort())?;

        let stats = match self.write_clips(sink, cancel, on_clip) {
            Ok(stats) => stats,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };
        sink.end().inspect_err(|_| sink.abort())?;

        tracing::info!(
            frames = stats.frames_total,
            rendered = stats.frames_rendered,
            elided = stats.frames_elided,
            "timeline written"
        );
        Ok(stats)
    }

    fn write_clips<S: FrameSink + ?Sized>(
        self,
        sink: &mut S,
        cancel: &CancelToken,
        mut on_clip: impl FnMut(ItemProgress),
    ) -> ReelResult<TimelineStats> {
        let expected = self.canvas.dims();
        let total = self.clips.len();
        let mut stats = TimelineStats::default();
        let mut next = 0u64;

        for (i, clip) in self.clips.into_iter().enumerate() {
            if cancel.is_canceled() {
                tracing::info!(completed = i, "cancellation observed while encoding");
                return Err(ReelError::Canceled {
                    stage: Stage::Encode,
                    completed: i,
                });
            }
            if clip.dims() != expected {
                return Err(ReelError::ResolutionMismatch {
                    clip: i,
                    expected,
                    got: clip.dims(),
                });
            }
            if clip.spec().frame_rate != self.fps {
                return Err(ReelError::validation(format!(
                    "clip {i} frame rate {}/{} differs from timeline {}/{}",
                    clip.spec().frame_rate.num,
                    clip.spec().frame_rate.den,
                    self.fps.num,
                    self.fps.den
                )));
            }

            let base = next;
            let clip_stats = clip
                .render(|local, frame| sink.push_frame(FrameIndex(base + local.0), frame))
                .map_err(|e| e.at_index(i))?;
            next += clip_stats.frames_total;

            stats.clips += 1;
            stats.frames_total += clip_stats.frames_total;
            stats.frames_rendered += clip_stats.frames_rendered;
            stats.frames_elided += clip_stats.frames_elided;
            tracing::debug!(clip = i, kind = %clip.kind(), frames = clip_stats.frames_total, "clip written");
            drop(clip);

            on_clip(ItemProgress {
                completed: i + 1,
                total,
            });
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/concat.rs"]
mod tests;
