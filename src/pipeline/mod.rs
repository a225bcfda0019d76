//! Job orchestration: validation, stage sequencing, progress, cancellation and output placement.

/// Cooperative cancellation.
pub mod cancel;
/// Render job description.
pub mod job;
/// Stage runner.
pub mod orchestrator;
/// Progress reports.
pub mod progress;
