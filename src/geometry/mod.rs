//! Pure crop and resize arithmetic for portrait framing.

/// Crop rectangles and resize targets.
pub mod crop;
