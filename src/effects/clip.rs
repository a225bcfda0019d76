use image::RgbImage;

use crate::{
    effects::{
        render::render_op_into,
        transitions::{FrameOp, TransitionKind, TransitionSpec},
    },
    foundation::{
        core::FrameIndex,
        error::{ReelError, ReelResult},
        math::Fnv1a64,
    },
    process::processor::CanonicalStill,
};

/// Per-clip render counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipStats {
    /// Frames handed to the consumer.
    pub frames_total: u64,
    /// Frames that needed pixel work.
    pub frames_rendered: u64,
    /// Frames reused from the previous frame or passed through from the still.
    pub frames_elided: u64,
}

/// One image's full on-screen time: a canonical still animated by a transition.
///
/// Frames are a pure function of `(still, spec, index)`. [`Clip::render`] produces them in order
/// and can be called any number of times with identical output.
#[derive(Clone, Debug)]
pub struct Clip {
    still: CanonicalStill,
    spec: TransitionSpec,
}

impl Clip {
    pub fn new(still: CanonicalStill, spec: TransitionSpec) -> ReelResult<Self> {
        spec.validate()?;
        if still.width() == 0 || still.height() == 0 {
            return Err(ReelError::InvalidDimensions {
                index: None,
                width: still.width(),
                height: still.height(),
            });
        }
        Ok(Self { still, spec })
    }

    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    pub fn kind(&self) -> TransitionKind {
        self.spec.kind
    }

    pub fn dims(&self) -> (u32, u32) {
        self.still.dims()
    }

    pub fn frame_count(&self) -> u64 {
        self.spec.frame_count()
    }

    /// On-screen time covered by this clip's frames.
    pub fn duration_secs(&self) -> f64 {
        self.spec.frame_rate.frames_to_secs(self.frame_count())
    }

    /// Compute a single frame on its own.
    pub fn frame(&self, i: FrameIndex) -> ReelResult<RgbImage> {
        if i.0 >= self.frame_count() {
            return Err(ReelError::validation(format!(
                "frame {} out of range for clip with {} frames",
                i.0,
                self.frame_count()
            )));
        }
        let src = self.still.as_image();
        let mut dst = RgbImage::new(src.width(), src.height());
        render_op_into(&mut dst, src, self.spec.frame_op(i))?;
        Ok(dst)
    }

    /// Produce every frame in order, handing each to `on_frame` with its clip-local index.
    ///
    /// Runs of frames with the same effect parameters reuse the last rendered buffer.
    pub fn render(
        &self,
        mut on_frame: impl FnMut(FrameIndex, &RgbImage) -> ReelResult<()>,
    ) -> ReelResult<ClipStats> {
        let src = self.still.as_image();
        let mut buf = RgbImage::new(src.width(), src.height());
        let mut buf_op: Option<FrameOp> = None;
        let mut stats = ClipStats::default();

        for i in 0..self.frame_count() {
            let idx = FrameIndex(i);
            let op = self.spec.frame_op(idx);
            let frame = if op == FrameOp::Identity {
                stats.frames_elided += 1;
                src
            } else {
                if buf_op == Some(op) {
                    stats.frames_elided += 1;
                } else {
                    render_op_into(&mut buf, src, op)?;
                    buf_op = Some(op);
                    stats.frames_rendered += 1;
                }
                &buf
            };
            on_frame(idx, frame)?;
            stats.frames_total += 1;
        }
        Ok(stats)
    }

    /// FNV-1a over every frame's pixels, in order.
    pub fn fingerprint(&self) -> ReelResult<u64> {
        let mut h = Fnv1a64::new_default();
        let (w, ht) = self.dims();
        h.write_u32(w);
        h.write_u32(ht);
        self.render(|_, frame| {
            h.write_bytes(frame.as_raw());
            Ok(())
        })?;
        Ok(h.finish())
    }

    /// Give the still back, releasing the clip.
    pub fn into_still(self) -> CanonicalStill {
        self.still
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/clip.rs"]
mod tests;
