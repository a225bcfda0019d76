//! Ordered clip sequence and its concatenation into a frame sink.

/// Clip concatenation.
pub mod concat;
