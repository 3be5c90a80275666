//! The transport contract.

use crate::error::Result;

/// Hands a finished message to a delivery agent.
///
/// `headers` is the rendered header block with every line terminated by the
/// message's line ending; `body` is the serialized MIME body.
pub trait Transport {
    /// Sends one message to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed over.
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()> {
        (**self).send(recipient, headers, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()> {
        (**self).send(recipient, headers, body)
    }
}

/// Line terminator used by a header block (`\r\n` or `\n`).
#[must_use]
pub fn line_ending_of(headers: &str) -> &'static str {
    if headers.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Joins headers and body into one message.
#[must_use]
pub fn assemble(headers: &str, body: &[u8]) -> Vec<u8> {
    let eol = line_ending_of(headers);
    let mut message = Vec::with_capacity(headers.len() + eol.len() + body.len());
    message.extend_from_slice(headers.as_bytes());
    if !headers.is_empty() && !headers.ends_with('\n') {
        message.extend_from_slice(eol.as_bytes());
    }
    message.extend_from_slice(eol.as_bytes());
    message.extend_from_slice(body);
    message
}

/// Finds the first value of a header in a rendered header block.
pub(crate) fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.lines().find_map(|line| {
        let (n, value) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Extracts the bare address from a header value such as `Name <a@b>`.
pub(crate) fn mailbox_address(value: &str) -> &str {
    match (value.rfind('<'), value.rfind('>')) {
        (Some(start), Some(end)) if start < end => value[start + 1..end].trim(),
        _ => value.trim(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending_of() {
        assert_eq!(line_ending_of("A: b\r\nC: d\r\n"), "\r\n");
        assert_eq!(line_ending_of("A: b\nC: d\n"), "\n");
    }

    #[test]
    fn test_assemble() {
        assert_eq!(assemble("A: b\r\n", b"body"), b"A: b\r\n\r\nbody");
        assert_eq!(assemble("A: b", b"body"), b"A: b\n\nbody");
    }

    #[test]
    fn test_header_value() {
        let headers = "From: <a@x.com>\nreturn-path: =?UTF-8?B?QQ==?= <r@x.com>\n";
        assert_eq!(header_value(headers, "Return-Path"), Some("=?UTF-8?B?QQ==?= <r@x.com>"));
        assert_eq!(header_value(headers, "To"), None);
    }

    #[test]
    fn test_mailbox_address() {
        assert_eq!(mailbox_address("=?UTF-8?B?QQ==?= <r@x.com>"), "r@x.com");
        assert_eq!(mailbox_address("plain@x.com"), "plain@x.com");
    }
}
