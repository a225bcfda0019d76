use image::{Rgb, RgbImage};

use super::*;
use crate::{
    effects::transitions::{TransitionKind, TransitionSpec},
    encode::sink::InMemorySink,
    process::processor::CanonicalStill,
};

const FPS: Fps = Fps { num: 30, den: 1 };

fn canvas() -> Canvas {
    Canvas {
        width: 18,
        height: 32,
    }
}

fn clip_sized(kind: TransitionKind, sd: f64, w: u32, h: u32, shade: u8) -> Clip {
    let still = CanonicalStill::from_rgb(RgbImage::from_pixel(w, h, Rgb([shade, 90, 200])));
    Clip::new(still, TransitionSpec::new(kind, 0.5, sd, FPS).unwrap()).unwrap()
}

fn clip(kind: TransitionKind, sd: f64, shade: u8) -> Clip {
    clip_sized(kind, sd, 18, 32, shade)
}

fn timeline(clips: impl IntoIterator<Item = Clip>) -> Timeline {
    let mut tl = Timeline::new(canvas(), FPS);
    for c in clips {
        tl.push(c);
    }
    tl
}

/// Sink that fails on a chosen global frame.
#[derive(Default)]
struct FailingSink {
    fail_at: u64,
    pushed: u64,
    ended: bool,
    aborted: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &RgbImage) -> ReelResult<()> {
        if idx.0 == self.fail_at {
            return Err(ReelError::encoding("disk full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn concatenates_clips_back_to_back() {
    let tl = timeline([
        clip(TransitionKind::ZoomIn, 4.0, 10),
        clip(TransitionKind::ZoomOut, 4.0, 20),
        clip(TransitionKind::FadeIn, 4.0, 30),
    ]);
    assert_eq!(tl.len(), 3);
    assert_eq!(tl.total_frames(), 360);
    assert!((tl.duration_secs() - 12.0).abs() < 1e-9);

    let mut sink = InMemorySink::new();
    let mut progress = Vec::new();
    let stats = tl
        .concatenate(&mut sink, &CancelToken::new(), |p| progress.push(p.completed))
        .unwrap();

    assert_eq!(stats.clips, 3);
    assert_eq!(stats.frames_total, 360);
    assert_eq!(stats.frames_rendered + stats.frames_elided, 360);
    assert_eq!(progress, vec![1, 2, 3]);

    assert!(sink.is_finished());
    assert_eq!(sink.frame_count(), 360);
    assert_eq!(sink.resolutions_seen(), &[(18, 32)]);
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, (0..360).collect::<Vec<_>>());
    // Clip boundaries land where the stills change.
    assert_eq!(sink.frames()[119].1.get_pixel(0, 0)[0], 10);
    assert_eq!(sink.frames()[359].1.get_pixel(0, 0)[0], 30);
}

#[test]
fn mixed_durations_sum_exactly() {
    let tl = timeline([
        clip(TransitionKind::FadeOut, 1.0, 1),
        clip(TransitionKind::FadeIn, 2.5, 2),
    ]);
    let mut sink = InMemorySink::counting();
    let stats = tl.concatenate(&mut sink, &CancelToken::new(), |_| {}).unwrap();
    assert_eq!(stats.frames_total, 30 + 75);
    assert_eq!(sink.frame_count(), 105);
}

#[test]
fn resolution_mismatch_is_fatal() {
    let tl = timeline([
        clip(TransitionKind::ZoomIn, 1.0, 1),
        clip_sized(TransitionKind::ZoomIn, 1.0, 20, 32, 2),
    ]);
    let mut sink = InMemorySink::new();
    let err = tl.concatenate(&mut sink, &CancelToken::new(), |_| {}).unwrap_err();
    match err {
        ReelError::ResolutionMismatch {
            clip,
            expected,
            got,
        } => {
            assert_eq!(clip, 1);
            assert_eq!(expected, (18, 32));
            assert_eq!(got, (20, 32));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.is_aborted());
    assert!(!sink.is_finished());
}

#[test]
fn sink_failure_aborts_and_names_the_clip() {
    let tl = timeline([
        clip(TransitionKind::ZoomIn, 1.0, 1),
        clip(TransitionKind::FadeIn, 1.0, 2),
    ]);
    let mut sink = FailingSink {
        fail_at: 40,
        ..FailingSink::default()
    };
    let err = tl.concatenate(&mut sink, &CancelToken::new(), |_| {}).unwrap_err();
    assert!(matches!(err, ReelError::EncodingFailure { clip: Some(1), .. }));
    assert_eq!(sink.pushed, 40);
    assert!(sink.aborted);
    assert!(!sink.ended);
}

#[test]
fn cancel_between_clips() {
    let cancel = CancelToken::new();
    let tl = timeline([
        clip(TransitionKind::ZoomIn, 1.0, 1),
        clip(TransitionKind::ZoomOut, 1.0, 2),
        clip(TransitionKind::FadeIn, 1.0, 3),
    ]);
    let mut sink = InMemorySink::counting();
    let err = tl
        .concatenate(&mut sink, &cancel, |p| {
            if p.completed == 1 {
                cancel.cancel();
            }
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ReelError::Canceled {
            stage: Stage::Encode,
            completed: 1
        }
    ));
    assert_eq!(sink.frame_count(), 30);
    assert!(sink.is_aborted());
}

#[test]
fn empty_timeline_is_rejected() {
    let mut sink = InMemorySink::new();
    assert!(
        Timeline::new(canvas(), FPS)
            .concatenate(&mut sink, &CancelToken::new(), |_| {})
            .is_err()
    );
}

#[test]
fn works_through_a_trait_object() {
    let mut sink = InMemorySink::counting();
    let dyn_sink: &mut dyn FrameSink = &mut sink;
    timeline([clip(TransitionKind::FadeOut, 1.0, 5)])
        .concatenate(dyn_sink, &CancelToken::new(), |_| {})
        .unwrap();
    assert_eq!(sink.frame_count(), 30);
}
