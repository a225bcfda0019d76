//! reelkit turns an ordered set of still images into a portrait slideshow reel.
//!
//! Each image is cropped and scaled to a canonical 9:16 frame, animated with a zoom or fade
//! transition, and the resulting clips are concatenated into one H.264 MP4:
//!
//! - Describe the work as a [`RenderJob`]
//! - Create a [`Pipeline`] from a [`ReelConfig`]
//! - [`Pipeline::run`] to an MP4, or [`Pipeline::run_with_sink`] into any [`FrameSink`]
#![forbid(unsafe_code)]

/// Image sources and decoding.
pub mod assets;
/// Render settings.
pub mod config;
/// Transition engine.
pub mod effects;
/// Frame sinks.
pub mod encode;
mod foundation;
/// Crop and resize arithmetic.
pub mod geometry;
/// Job orchestration.
pub mod pipeline;
/// Canonical still production.
pub mod process;
/// Clip concatenation.
pub mod timeline;

pub use crate::foundation::core::{AspectRatio, Canvas, Fps, FrameIndex, Stage};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::decode::ImageSource;
pub use crate::config::{EncoderProfile, ReelConfig, ResampleFilter};
pub use crate::effects::clip::{Clip, ClipStats};
pub use crate::effects::transitions::{FrameOp, TransitionKind, TransitionSet, TransitionSpec};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geometry::crop::{CropRect, compute_crop_rect, compute_resize_target};
pub use crate::pipeline::cancel::CancelToken;
pub use crate::pipeline::job::{DEFAULT_STILL_SECS, RenderJob};
pub use crate::pipeline::orchestrator::{Pipeline, RenderSummary};
pub use crate::pipeline::progress::{NoProgress, Progress, ProgressReporter};
pub use crate::process::processor::{CanonicalStill, ImageProcessor, ItemProgress};
pub use crate::timeline::concat::{Timeline, TimelineStats};
