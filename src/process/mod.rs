/// Canonical still production.
pub mod processor;
