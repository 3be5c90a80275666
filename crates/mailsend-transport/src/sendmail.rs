//! Delivery through a local sendmail-compatible binary.

use crate::error::{Error, Result};
use crate::transport::{Transport, assemble, header_value, mailbox_address};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// Default location of the sendmail binary.
pub const DEFAULT_SENDMAIL_PATH: &str = "/usr/sbin/sendmail";

/// Sendmail command configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendmailConfig {
    /// Path of the sendmail binary.
    pub path: String,
    /// Arguments passed before the envelope options.
    pub args: Vec<String>,
}

impl Default for SendmailConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SENDMAIL_PATH.to_string(),
            args: vec!["-i".to_string()],
        }
    }
}

/// Pipes messages into `sendmail [args] [-f sender] -- recipient`.
///
/// The envelope sender is taken from the `Return-Path` header, or from
/// `From` when `Return-Path` is empty or missing. `Return-Path` itself is
/// not passed on, the receiving MTA adds it.
#[derive(Debug, Clone, Default)]
pub struct SendmailTransport {
    config: SendmailConfig,
}

impl SendmailTransport {
    /// Creates a transport using `/usr/sbin/sendmail -i`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport from configuration.
    #[must_use]
    pub const fn with_config(config: SendmailConfig) -> Self {
        Self { config }
    }

    /// Returns the command configuration.
    #[must_use]
    pub const fn config(&self) -> &SendmailConfig {
        &self.config
    }

    /// Arguments for one invocation.
    fn command_args(&self, envelope_from: Option<&str>, recipient: &str) -> Vec<String> {
        let mut args = self.config.args.clone();
        if let Some(from) = envelope_from {
            args.push("-f".to_string());
            args.push(from.to_string());
        }
        args.push("--".to_string());
        args.push(recipient.to_string());
        args
    }
}

/// Envelope sender from `Return-Path`, falling back to `From`.
fn envelope_sender(headers: &str) -> Option<&str> {
    ["Return-Path", "From"]
        .into_iter()
        .filter_map(|name| header_value(headers, name))
        .map(mailbox_address)
        .find(|address| !address.is_empty())
}

/// The header block without its `Return-Path` lines.
fn strip_return_path(headers: &str) -> String {
    headers
        .split_inclusive('\n')
        .filter(|line| {
            !line
                .split_once(':')
                .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("Return-Path"))
        })
        .collect()
}

impl Transport for SendmailTransport {
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()> {
        let from = envelope_sender(headers);
        let args = self.command_args(from, recipient);
        debug!(program = %self.config.path, ?args, "spawning sendmail");

        let mut child = Command::new(&self.config.path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.config.path.clone(),
                source,
            })?;

        let message = assemble(&strip_return_path(headers), body);
        let bytes = message.len();

        // stdin is fed from a thread while stderr is drained here
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(&message))
        });

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sendmail stdin unavailable")),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(code = ?output.status.code(), %stderr, "sendmail failed");
            return Err(Error::ExitStatus {
                code: output.status.code(),
                stderr,
            });
        }
        if let Err(e) = written {
            warn!(error = %e, "sendmail exited before reading the message");
            return Err(Error::Io(e));
        }

        info!(recipient, bytes, "message handed to sendmail");
        Ok(())
    }
}
