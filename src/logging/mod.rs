//! Structured logging setup and JSON result lines.

mod format;

pub use format::{PredictionLog, StructuredLogger};
