use thiserror::Error;

use crate::directory::LoadState;

/// Failures reported by the user directory controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Initial load could not reach the remote collection. Terminal for
    /// the controller.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A single add, edit or delete did not apply.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Directory not ready (state: {0})")]
    NotReady(LoadState),
}

impl DirectoryError {
    /// Whether the presentation layer should block on this error rather
    /// than show a transient notice.
    pub fn is_blocking(&self) -> bool {
        matches!(self, DirectoryError::SourceUnavailable(_))
    }
}
