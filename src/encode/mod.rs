//! Encoding sinks.
//!
//! Sinks consume frames in timeline order and are driven by [`crate::timeline::Timeline`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
