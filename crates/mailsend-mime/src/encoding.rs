//! MIME encoding and decoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 header encoding.
//! Encoders take the line terminator explicitly so that the same message
//! can be produced for `\n` and `\r\n` transports.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum line length for encoded body lines (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, folded into lines of at most 76 characters.
#[must_use]
pub fn encode_base64_lines(data: &[u8], eol: &str) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);

    for (i, ch) in encoded.chars().enumerate() {
        if i > 0 && i % MAX_LINE_LENGTH == 0 {
            result.push_str(eol);
        }
        result.push(ch);
    }

    result
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Hard line breaks in the input (`\n` or `\r\n`) are kept and written
/// with `eol`; long lines get soft breaks so that no output line exceeds
/// 76 characters.
#[must_use]
pub fn encode_quoted_printable(text: &str, eol: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.next() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        encode_quoted_printable_line(line.as_bytes(), eol, &mut result);
        if lines.peek().is_some() {
            result.push_str(eol);
        }
    }

    result
}

fn encode_quoted_printable_line(bytes: &[u8], eol: &str, out: &mut String) {
    let mut line_length = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let at_line_end = i + 1 == bytes.len();
        // Trailing whitespace must be encoded or transports may strip it
        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            b' ' | b'\t' => !at_line_end,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // Leave room for the '=' of a soft line break
        if line_length + width > MAX_LINE_LENGTH - 1 {
            out.push('=');
            out.push_str(eol);
            line_length = 0;
        }

        if literal {
            out.push(byte as char);
        } else {
            let _ = write!(out, "={byte:02X}");
        }
        line_length += width;
    }
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let mut result = Vec::new();
    let mut bytes = text.bytes().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'=' {
            result.push(byte);
            continue;
        }

        // Soft line break
        if bytes.peek() == Some(&b'\r') {
            bytes.next();
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
            }
            continue;
        } else if bytes.peek() == Some(&b'\n') {
            bytes.next();
            continue;
        }

        let hex: Vec<u8> = bytes.by_ref().take(2).collect();
        if hex.len() != 2 {
            return Err(Error::InvalidEncoding(
                "Incomplete escape sequence".to_string(),
            ));
        }
        let hex = std::str::from_utf8(&hex)
            .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
        let byte = u8::from_str_radix(hex, 16)
            .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
        result.push(byte);
    }

    String::from_utf8(result).map_err(Into::into)
}

/// Encodes text as a single RFC 2047 "B" encoded word, unconditionally.
///
/// Format: `=?charset?B?encoded-text?=`
#[must_use]
pub fn encode_rfc2047_word(text: &str, charset: &str) -> String {
    let encoded = encode_base64(text.as_bytes());
    format!("=?{charset}?B?{encoded}?=")
}

/// Encodes a header value using RFC 2047 encoding if needed.
///
/// Printable ASCII without `=`, `?`, `"` or `\` is returned unchanged.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    let plain = text.chars().all(|c| {
        c.is_ascii() && !c.is_ascii_control() && !matches!(c, '=' | '?' | '"' | '\\')
    });
    if plain {
        return text.to_string();
    }
    encode_rfc2047_word(text, charset)
}

/// Decodes RFC 2047 encoded header value.
///
/// Format: `=?charset?encoding?encoded-text?=`
///
/// Surrounding whitespace is ignored; values that are not an encoded word
/// are returned unchanged.
///
/// # Errors
///
/// Returns an error if the input is not valid RFC 2047 format.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("=?")
        .and_then(|rest| rest.strip_suffix("?="))
    else {
        return Ok(text.to_string());
    };

    let parts: Vec<&str> = inner.split('?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    };

    match encoding.to_uppercase().as_str() {
        "B" => {
            let decoded = decode_base64(encoded_text)?;
            String::from_utf8(decoded).map_err(Into::into)
        }
        "Q" => {
            // Quoted-Printable with underscore for space
            let text_with_spaces = encoded_text.replace('_', " ");
            decode_quoted_printable(&text_with_spaces)
        }
        other => Err(Error::InvalidEncoding(format!("Unknown encoding: {other}"))),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_lines_folds_at_76() {
        let data = vec![0u8; 120];
        let encoded = encode_base64_lines(&data, "\r\n");
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines[1].len(), 76);
        assert_eq!(lines[2].len(), 8);
    }

    #[test]
    fn test_quoted_printable_encode() {
        assert_eq!(encode_quoted_printable("Hello, World!", "\n"), "Hello, World!");

        let encoded = encode_quoted_printable("Héllo, Wørld!", "\n");
        assert_eq!(encoded, "H=C3=A9llo, W=C3=B8rld!");
    }

    #[test]
    fn test_quoted_printable_keeps_hard_breaks() {
        let encoded = encode_quoted_printable("<p>one</p>\r\n<p>two</p>", "\n");
        assert_eq!(encoded, "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn test_quoted_printable_trailing_space() {
        assert_eq!(encode_quoted_printable("end ", "\n"), "end=20");
        assert_eq!(encode_quoted_printable("a=b", "\n"), "a=3Db");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        let text = "x".repeat(200);
        let encoded = encode_quoted_printable(&text, "\r\n");
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH, "line too long: {}", line.len());
        }
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello, World!").unwrap(), "Hello, World!");
        assert_eq!(decode_quoted_printable("H=C3=A9llo").unwrap(), "Héllo");
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld").unwrap(), "HelloWorld");
        assert_eq!(decode_quoted_printable("Hello=\nWorld").unwrap(), "HelloWorld");
        assert!(decode_quoted_printable("bad=4").is_err());
    }

    #[test]
    fn test_rfc2047_word() {
        assert_eq!(encode_rfc2047_word("Hello", "UTF-8"), "=?UTF-8?B?SGVsbG8=?=");
    }

    #[test]
    fn test_rfc2047_encode() {
        assert_eq!(encode_rfc2047("report.pdf", "UTF-8"), "report.pdf");
        assert!(encode_rfc2047("say \"hi\".txt", "UTF-8").starts_with("=?UTF-8?B?"));
        assert!(encode_rfc2047("a\\b", "UTF-8").starts_with("=?UTF-8?B?"));

        let encoded = encode_rfc2047("evil.txt\r\nX-Injected: yes", "UTF-8");
        assert!(!encoded.contains('\n'));
        assert_eq!(decode_rfc2047(&encoded).unwrap(), "evil.txt\r\nX-Injected: yes");

        let encoded = encode_rfc2047("отчёт.pdf", "UTF-8");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_rfc2047_decode() {
        assert_eq!(decode_rfc2047("Hello").unwrap(), "Hello");
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
        assert_eq!(decode_rfc2047("=?UTF-8?B?SGVsbG8=?= ").unwrap(), "Hello");
        assert_eq!(decode_rfc2047("=?utf-8?Q?H=C3=A9llo?=").unwrap(), "Héllo");
        assert!(decode_rfc2047("=?utf-8?X?abc?=").is_err());
    }

    proptest! {
        #[test]
        fn prop_quoted_printable_lines_fit(text in "\\PC{0,300}") {
            let encoded = encode_quoted_printable(&text, "\n");
            for line in encoded.split('\n') {
                prop_assert!(line.len() <= MAX_LINE_LENGTH);
            }
            prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
        }
    }
}
