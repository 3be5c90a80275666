//! Mailer configuration.
//!
//! Stored as JSON:
//!
//! ```json
//! {
//!   "host": "example.com",
//!   "line_ending": "lf",
//!   "sendmail": { "path": "/usr/sbin/sendmail", "args": ["-i"] }
//! }
//! ```
//!
//! Only `host` is required.

use crate::error::{Error, Result};
use mailsend_mime::LineEnding;
use mailsend_transport::SendmailConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Settings for a [`MailMessage`](crate::MailMessage) delivering through sendmail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Host for `noreply@<host>` and message IDs.
    pub host: String,
    /// Line terminator; the platform's own if unset.
    #[serde(default)]
    pub line_ending: LineEnding,
    /// Sendmail command.
    #[serde(default)]
    pub sendmail: SendmailConfig,
}

impl MailerConfig {
    /// Creates a configuration for `host` with defaults for everything else.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            line_ending: LineEnding::native(),
            sendmail: SendmailConfig::default(),
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading mailer config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty host or sendmail path.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.sendmail.path.trim().is_empty() {
            return Err(Error::Config("sendmail path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config() {
        let config = MailerConfig::from_json_str(r#"{"host": "example.com"}"#).unwrap();
        assert_eq!(config, MailerConfig::new("example.com"));
        assert_eq!(config.sendmail.path, "/usr/sbin/sendmail");
    }

    #[test]
    fn test_full_config() {
        let config = MailerConfig::from_json_str(
            r#"{
                "host": "example.com",
                "line_ending": "crlf",
                "sendmail": {"path": "/usr/lib/sendmail", "args": ["-i", "-odb"]}
            }"#,
        )
        .unwrap();
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert_eq!(config.sendmail.path, "/usr/lib/sendmail");
        assert_eq!(config.sendmail.args, vec!["-i", "-odb"]);
    }

    #[test]
    fn test_partial_sendmail_section() {
        let config = MailerConfig::from_json_str(
            r#"{"host": "example.com", "sendmail": {"path": "/opt/bin/sendmail"}}"#,
        )
        .unwrap();
        assert_eq!(config.sendmail.args, vec!["-i"]);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            MailerConfig::from_json_str(r#"{"host": " "}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            MailerConfig::from_json_str(r#"{"line_ending": "lf"}"#),
            Err(Error::Serde(_))
        ));
        assert!(matches!(
            MailerConfig::from_json_str(r#"{"host": "h", "line_ending": "cr"}"#),
            Err(Error::Serde(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host": "mail.example.org", "line_ending": "lf"}}"#).unwrap();

        let config = MailerConfig::load(file.path()).unwrap();
        assert_eq!(config.host, "mail.example.org");
        assert_eq!(config.line_ending, LineEnding::Lf);

        assert!(matches!(
            MailerConfig::load("/nonexistent/mailsend.json"),
            Err(Error::Io(_))
        ));
    }
}
