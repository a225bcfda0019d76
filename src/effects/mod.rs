//! Transition engine: per-kind frame parameters, pixel kernels and lazily rendered clips.

/// Lazily rendered clips.
pub mod clip;
/// Pixel kernels for zoom and fade.
pub mod render;
/// Transition kinds, selection policy and timing.
pub mod transitions;
