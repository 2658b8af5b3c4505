//! Central error surfacing
//!
//! The pipeline reports every failed note through one [`ErrorReporter`],
//! so hosts can turn failures into notifications.

use crate::error::NoteError;

/// Receives every failure the pipeline encounters
pub trait ErrorReporter: Send + Sync {
    /// Report a failure; `stage` names the parser or step that failed
    fn report(&self, stage: &str, error: &NoteError);
}

/// Reporter that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, stage: &str, error: &NoteError) {
        match error {
            NoteError::InvalidInput(_) | NoteError::NoteExists(_) => {
                tracing::warn!(stage, error = %error, "Note not created");
            }
            _ => tracing::error!(stage, error = %error, "Note not created"),
        }
    }
}
