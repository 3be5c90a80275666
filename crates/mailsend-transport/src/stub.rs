//! In-memory transport for tests and dry runs.

use crate::error::{Error, Result};
use crate::transport::Transport;
use tracing::debug;

/// A message captured by [`StubTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient the message was sent to.
    pub recipient: String,
    /// Rendered header block.
    pub headers: String,
    /// Serialized body.
    pub body: Vec<u8>,
}

/// Records messages instead of sending them.
///
/// A failing stub records nothing and returns [`Error::Rejected`].
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    sent: Vec<SentMessage>,
    failure: Option<String>,
}

impl StubTransport {
    /// Creates a stub that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub that rejects every message with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Vec::new(),
            failure: Some(reason.into()),
        }
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> &[SentMessage] {
        &self.sent
    }

    /// Removes and returns the accepted messages.
    pub fn take_sent(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for StubTransport {
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()> {
        if let Some(reason) = &self.failure {
            debug!(recipient, %reason, "stub transport rejecting message");
            return Err(Error::Rejected(reason.clone()));
        }

        debug!(recipient, "stub transport recording message");
        self.sent.push(SentMessage {
            recipient: recipient.to_string(),
            headers: headers.to_string(),
            body: body.to_vec(),
        });
        Ok(())
    }
}
