//! Builder options: line terminator, transfer encodings and charsets.

use crate::encoding::{encode_base64_lines, encode_quoted_printable};
use std::fmt;

/// Line terminator used when rendering headers and bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    /// `\n`, what a local sendmail binary expects on Unix.
    Lf,
    /// `\r\n`, the RFC 5322 wire format.
    CrLf,
}

impl LineEnding {
    /// Line terminator of the platform this was compiled for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) { Self::CrLf } else { Self::Lf }
    }

    /// The terminator as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Encodes a part body, using `eol` for every line break.
    #[must_use]
    pub fn encode(self, data: &[u8], eol: LineEnding) -> String {
        let eol = eol.as_str();
        match self {
            Self::Base64 => encode_base64_lines(data, eol),
            Self::QuotedPrintable => encode_quoted_printable(&String::from_utf8_lossy(data), eol),
            Self::SevenBit | Self::EightBit => String::from_utf8_lossy(data)
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect::<Vec<_>>()
                .join(eol),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Options a MIME builder is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeOptions {
    /// Line terminator for headers and bodies.
    pub line_ending: LineEnding,
    /// Transfer encoding of the plain-text part.
    pub text_encoding: TransferEncoding,
    /// Charset of the plain-text part.
    pub text_charset: String,
    /// Transfer encoding of the HTML part.
    pub html_encoding: TransferEncoding,
    /// Charset of the HTML part.
    pub html_charset: String,
}

impl MimeOptions {
    /// Options with the given line ending and UTF-8 text parts.
    #[must_use]
    pub fn new(line_ending: LineEnding) -> Self {
        Self {
            line_ending,
            ..Self::default()
        }
    }
}

impl Default for MimeOptions {
    /// Base64 text, quoted-printable HTML, both UTF-8, native line ending.
    fn default() -> Self {
        Self {
            line_ending: LineEnding::native(),
            text_encoding: TransferEncoding::Base64,
            text_charset: "utf-8".to_string(),
            html_encoding: TransferEncoding::QuotedPrintable,
            html_charset: "utf-8".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::parse("BASE64"), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::parse(" quoted-printable "),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(TransferEncoding::parse("x-unknown"), TransferEncoding::SevenBit);
    }

    #[test]
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
        assert_eq!(TransferEncoding::Base64.to_string(), "base64");
    }

    #[test]
    fn test_seven_bit_normalizes_line_endings() {
        let encoded = TransferEncoding::SevenBit.encode(b"a\r\nb\nc", LineEnding::CrLf);
        assert_eq!(encoded, "a\r\nb\r\nc");
    }

    #[test]
    fn test_default_options() {
        let options = MimeOptions::new(LineEnding::CrLf);
        assert_eq!(options.line_ending, LineEnding::CrLf);
        assert_eq!(options.text_encoding, TransferEncoding::Base64);
        assert_eq!(options.html_encoding, TransferEncoding::QuotedPrintable);
        assert_eq!(options.text_charset, "utf-8");
        assert_eq!(options.html_charset, "utf-8");
    }
}
