//! Error types for the mail sender.

use thiserror::Error;

/// Errors that can occur while composing or sending mail.
#[derive(Debug, Error)]
pub enum Error {
    /// MIME composition failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailsend_mime::Error),

    /// The transport did not accept the message.
    #[error("Transport error: {0}")]
    Transport(#[from] mailsend_transport::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
