//! Header values built by the sender: encoded names, mailboxes and the
//! default `Date`/`X-Priority`/`Message-ID` set.

use chrono::Local;
use mailsend_mime::Headers;
use mailsend_mime::encoding::encode_rfc2047_word;
use mailsend_mime::id::unique_token;

/// Value of the `X-Priority` header on every message.
pub const DEFAULT_PRIORITY: &str = "3 (Normal)";

/// Encodes text as a UTF-8 base64 encoded word followed by one space.
///
/// The trailing space separates an encoded display name from the address
/// that follows it and is also kept on the `Subject` header.
///
/// ```
/// assert_eq!(mailsend::encode("Hello"), "=?UTF-8?B?SGVsbG8=?= ");
/// ```
#[must_use]
pub fn encode(text: &str) -> String {
    let mut word = encode_rfc2047_word(text, "UTF-8");
    word.push(' ');
    word
}

/// The `noreply@<host>` address used when no sender is set.
#[must_use]
pub fn default_address(host: &str) -> String {
    format!("noreply@{host}")
}

/// Formats `[encoded name ]<address>`, using `noreply@<host>` when
/// `address` is unset.
#[must_use]
pub fn format_mailbox(name: Option<&str>, address: Option<&str>, host: &str) -> String {
    let mut header = name.map(encode).unwrap_or_default();
    header.push('<');
    match address {
        Some(address) => header.push_str(address),
        None => header.push_str(&default_address(host)),
    }
    header.push('>');
    header
}

/// `From` header value.
#[must_use]
pub fn from_header(sender_name: Option<&str>, from: Option<&str>, host: &str) -> String {
    format_mailbox(sender_name, from, host)
}

/// `Return-Path` header value; empty unless a non-empty return path is set.
#[must_use]
pub fn return_path_header(
    sender_name: Option<&str>,
    return_path: Option<&str>,
    host: &str,
) -> String {
    match return_path {
        Some(path) if !path.is_empty() => format_mailbox(sender_name, Some(path), host),
        _ => String::new(),
    }
}

/// `To` header value for the address a message is actually sent to.
#[must_use]
pub fn recipient_header(recipient_name: Option<&str>, recipient: &str) -> String {
    let mut header = recipient_name.map(encode).unwrap_or_default();
    header.push('<');
    header.push_str(recipient);
    header.push('>');
    header
}

/// `Subject` header value.
#[must_use]
pub fn subject_header(subject: &str) -> String {
    encode(subject)
}

/// A fresh `<token@host>` message ID.
#[must_use]
pub fn message_id(host: &str) -> String {
    format!("<{}@{host}>", unique_token())
}

/// The headers every message starts from.
#[must_use]
pub fn default_headers(host: &str) -> Headers {
    let mut headers = Headers::new();
    headers.set("Date", Local::now().to_rfc2822());
    headers.set("X-Priority", DEFAULT_PRIORITY);
    headers.set("Message-ID", message_id(host));
    headers
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsend_mime::encoding::decode_rfc2047;

    #[test]
    fn test_encode_keeps_trailing_space() {
        assert_eq!(encode("Hello"), "=?UTF-8?B?SGVsbG8=?= ");
        assert_eq!(encode(""), "=?UTF-8?B??= ");
        assert_eq!(decode_rfc2047(&encode("Привет")).unwrap(), "Привет");
    }

    #[test]
    fn test_from_header_defaults_to_noreply() {
        assert_eq!(from_header(None, None, "example.com"), "<noreply@example.com>");
    }

    #[test]
    fn test_from_header_with_name() {
        assert_eq!(
            from_header(Some("A"), Some("a@x.com"), "example.com"),
            "=?UTF-8?B?QQ==?= <a@x.com>"
        );
        assert_eq!(
            from_header(Some("A"), None, "example.com"),
            "=?UTF-8?B?QQ==?= <noreply@example.com>"
        );
    }

    #[test]
    fn test_return_path_only_when_set() {
        assert_eq!(return_path_header(Some("A"), None, "example.com"), "");
        assert_eq!(return_path_header(None, Some(""), "example.com"), "");
        assert_eq!(
            return_path_header(Some("A"), Some("bounce@x.com"), "example.com"),
            "=?UTF-8?B?QQ==?= <bounce@x.com>"
        );
    }

    #[test]
    fn test_recipient_header() {
        assert_eq!(recipient_header(None, "u@y.com"), "<u@y.com>");
        assert_eq!(recipient_header(Some("A"), "u@y.com"), "=?UTF-8?B?QQ==?= <u@y.com>");
    }

    #[test]
    fn test_subject_header() {
        assert_eq!(subject_header("Hello"), "=?UTF-8?B?SGVsbG8=?= ");
    }

    #[test]
    fn test_default_headers() {
        let headers = default_headers("example.com");
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("X-Priority"), Some("3 (Normal)"));
        assert!(chrono::DateTime::parse_from_rfc2822(headers.get("Date").unwrap()).is_ok());

        let id = headers.get("Message-ID").unwrap();
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@example.com>"));
        assert_eq!(id.len(), "<@example.com>".len() + 32);
    }

    #[test]
    fn test_message_ids_are_unique() {
        assert_ne!(message_id("h"), message_id("h"));
    }
}
