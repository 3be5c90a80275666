//! MIME content type handling.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Content type used when a caller does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx), rendered in key order.
    pub parameters: BTreeMap<String, String>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Creates a text/plain content type with the given charset.
    #[must_use]
    pub fn text_plain(charset: &str) -> Self {
        Self::new("text", "plain").with_parameter("charset", charset)
    }

    /// Creates a text/html content type with the given charset.
    #[must_use]
    pub fn text_html(charset: &str) -> Self {
        Self::new("text", "html").with_parameter("charset", charset)
    }

    /// Creates a `multipart/<sub_type>` content type with boundary.
    #[must_use]
    pub fn multipart(sub_type: &str, boundary: impl Into<String>) -> Self {
        Self::new("multipart", sub_type).with_parameter("boundary", boundary)
    }

    /// Creates the `application/octet-stream` content type.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary").map(String::as_str)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');

        let type_str = parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidContentType("Empty content type".to_string()))?;

        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("Missing subtype in {type_str}")))?;

        let main_type = main_type.trim().to_lowercase();
        let sub_type = sub_type.trim().to_lowercase();
        if main_type.is_empty() || sub_type.is_empty() {
            return Err(Error::InvalidContentType(type_str.to_string()));
        }

        let mut content_type = Self::new(main_type, sub_type);

        for param in parts {
            if let Some((key, value)) = param.trim().split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().trim_matches('"').to_string();
                content_type.parameters.insert(key, value);
            }
        }

        Ok(content_type)
    }

    /// Parses a caller-supplied content type, falling back to
    /// `application/octet-stream` when it is not a valid `type/subtype`.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|_| Self::octet_stream())
    }
}

/// Renders `value` as a quoted-string.
///
/// Backslashes and quotes are escaped; CR and LF are dropped.
pub(crate) fn quoted_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars().filter(|c| !matches!(c, '\r' | '\n')) {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl Default for ContentType {
    fn default() -> Self {
        Self::octet_stream()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in &self.parameters {
            if value.contains(|c: char| {
                c.is_whitespace() || c.is_control() || "()<>@,;:\\\"/[]?=".contains(c)
            }) {
                write!(f, "; {key}={}", quoted_string(value))?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_new() {
        let ct = ContentType::new("text", "plain");
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "plain");
        assert!(ct.parameters.is_empty());
    }

    #[test]
    fn test_text_plain() {
        let ct = ContentType::text_plain("utf-8");
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_multipart() {
        let ct = ContentType::multipart("related", "=_abc");
        assert_eq!(ct.sub_type, "related");
        assert_eq!(ct.boundary(), Some("=_abc"));
        assert!(ct.is_multipart());
        assert_eq!(ct.to_string(), "multipart/related; boundary=\"=_abc\"");
    }

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("Text/Plain; charset=utf-8").unwrap();
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "plain");
        assert_eq!(ct.charset(), Some("utf-8"));
    }

    #[test]
    fn test_content_type_parse_quoted() {
        let ct = ContentType::parse("multipart/mixed; boundary=\"----=_Part_123\"").unwrap();
        assert_eq!(ct.boundary(), Some("----=_Part_123"));
    }

    #[test]
    fn test_content_type_parse_invalid() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("image").is_err());
        assert!(ContentType::parse("image/").is_err());
        assert_eq!(ContentType::parse_or_default("garbage"), ContentType::octet_stream());
        assert_eq!(ContentType::octet_stream().to_string(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_parameters_render_sorted() {
        let ct = ContentType::new("text", "plain")
            .with_parameter("format", "flowed")
            .with_parameter("charset", "iso-8859-1");

        assert_eq!(ct.to_string(), "text/plain; charset=iso-8859-1; format=flowed");
    }

    #[test]
    fn test_parameter_values_escaped() {
        let ct = ContentType::new("text", "plain").with_parameter("name", r#"say "hi"\.txt"#);
        assert_eq!(ct.to_string(), r#"text/plain; name="say \"hi\"\\.txt""#);

        let ct = ContentType::new("text", "plain")
            .with_parameter("name", "a.txt\r\nX-Injected: yes");
        assert_eq!(ct.to_string(), "text/plain; name=\"a.txtX-Injected: yes\"");
    }
}
