//! Error types for transport operations.

use std::io;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sendmail binary could not be started.
    #[error("Cannot run {program}: {source}")]
    Spawn {
        /// Program that was started.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The sendmail binary exited unsuccessfully.
    #[error(
        "sendmail returned error code {}: {stderr}",
        code.map_or_else(|| "none".to_string(), |c| c.to_string())
    )]
    ExitStatus {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The transport refused the message.
    #[error("Message rejected: {0}")]
    Rejected(String),
}

impl Error {
    /// Returns the process exit code for [`Error::ExitStatus`].
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitStatus { code, .. } => *code,
            _ => None,
        }
    }
}
