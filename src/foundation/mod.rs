/// Shared value types (frame indices, fps, canvas, aspect ratio, stages).
pub mod core;
/// Crate error taxonomy.
pub mod error;
pub(crate) mod math;
