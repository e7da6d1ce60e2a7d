//! Error types for editor operations.
//!
//! None of these are fatal. The controller absorbs every variant at its
//! public boundary and logs it; they exist so that internal helpers can use
//! `?` and so the absorbed failure is named in the trace.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur inside the editor controller or synchronizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// No saved selection to restore, or restoring it failed.
    #[error("no saved selection available")]
    SelectionUnavailable,

    /// A command-state or command-value query is unsupported by the host.
    #[error("backend query `{command}` failed: {reason}")]
    BackendQuery { command: String, reason: String },

    /// The source surface could not be read structurally.
    #[error("malformed mode transition input: {0}")]
    MalformedModeTransitionInput(String),

    /// A platform primitive failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl EditorError {
    pub(crate) fn query(command: &str, err: PlatformError) -> Self {
        EditorError::BackendQuery {
            command: command.to_string(),
            reason: err.0,
        }
    }
}
