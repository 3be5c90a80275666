//! Multipart message assembly.
//!
//! [`MimeComposer`] is the contract a message sender drives: bodies, inline
//! images and attachments go in, a header block and a serialized body come
//! out. [`MimeBuilder`] is the implementation shipped with this crate.
//!
//! The body layout follows the usual nesting:
//!
//! ```text
//! multipart/mixed                  (only with attachments)
//! ├── multipart/related            (only with HTML and inline images)
//! │   ├── multipart/alternative    (only with both text and HTML)
//! │   │   ├── text/plain
//! │   │   └── text/html
//! │   └── image/*                  (inline, Content-ID)
//! └── application/*                (attachments)
//! ```

use crate::address::derive_host_from_address;
use crate::content_type::{ContentType, quoted_string};
use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::id::{boundary, unique_token};
use crate::options::{LineEnding, MimeOptions, TransferEncoding};
use std::path::Path;
use tracing::debug;

/// Domain used for generated content IDs when no `From` header is known.
const FALLBACK_CID_DOMAIN: &str = "localhost";

/// Builds the MIME structure of one outgoing message.
///
/// A composer is created per message. [`render_headers`](Self::render_headers)
/// is expected to run before [`render_body`](Self::render_body), since the
/// `From` header it receives decides the host part of generated content IDs.
pub trait MimeComposer {
    /// Creates an empty composer.
    fn with_options(options: MimeOptions) -> Self
    where
        Self: Sized;

    /// Sets the plain-text body.
    fn set_text_body(&mut self, text: &str);

    /// Sets the HTML body.
    fn set_html_body(&mut self, html: &str);

    /// Adds an image referenced from the HTML body.
    ///
    /// When `is_path` is true `file` names a file to read, otherwise it is
    /// the image data itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn add_inline_image(
        &mut self,
        file: &str,
        content_type: &str,
        name: &str,
        is_path: bool,
        content_id: Option<&str>,
    ) -> Result<()>;

    /// Adds an attachment.
    ///
    /// When `is_path` is true `file` names a file to read, otherwise it is
    /// the attachment data itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn add_attachment(
        &mut self,
        file: &str,
        content_type: &str,
        name: &str,
        is_path: bool,
    ) -> Result<()>;

    /// Renders the full header block: `extra` merged with the MIME headers.
    fn render_headers(&mut self, extra: &Headers) -> String;

    /// Renders the message body.
    fn render_body(&mut self) -> Vec<u8>;
}

/// How a file part is presented to the mail client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// An image or attachment with its data already loaded.
#[derive(Debug, Clone)]
struct FilePart {
    data: Vec<u8>,
    content_type: ContentType,
    filename: String,
    content_id: Option<String>,
    disposition: Disposition,
}

impl FilePart {
    fn load(file: &str, content_type: &str, name: &str, is_path: bool) -> Result<Self> {
        let data = if is_path {
            std::fs::read(file).map_err(|source| Error::FileRead {
                path: file.into(),
                source,
            })?
        } else {
            file.as_bytes().to_vec()
        };

        let filename = if name.is_empty() && is_path {
            Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            name.to_string()
        };

        Ok(Self {
            data,
            content_type: ContentType::parse_or_default(content_type),
            filename,
            content_id: None,
            disposition: Disposition::Attachment,
        })
    }

    fn to_node(&self, eol: LineEnding) -> Node {
        let mut headers = Headers::new();
        let mut content_type = self.content_type.clone();
        let filename = encode_rfc2047(&self.filename, "UTF-8");
        if !filename.is_empty() {
            content_type = content_type.with_parameter("name", filename.clone());
        }
        headers.add("Content-Type", content_type.to_string());
        headers.add("Content-Transfer-Encoding", TransferEncoding::Base64.to_string());
        if let Some(cid) = &self.content_id {
            headers.add("Content-ID", format!("<{cid}>"));
        }
        let disposition = if filename.is_empty() {
            self.disposition.as_str().to_string()
        } else {
            format!("{}; filename={}", self.disposition.as_str(), quoted_string(&filename))
        };
        headers.add("Content-Disposition", disposition);

        Node::Leaf {
            headers,
            body: TransferEncoding::Base64.encode(&self.data, eol),
        }
    }
}

/// One entity of the rendered tree.
#[derive(Debug)]
enum Node {
    Leaf {
        headers: Headers,
        body: String,
    },
    Multipart {
        content_type: ContentType,
        boundary: String,
        children: Vec<Node>,
    },
}

impl Node {
    fn multipart(sub_type: &str, boundary: &str, children: Vec<Self>) -> Self {
        Self::Multipart {
            content_type: ContentType::multipart(sub_type, boundary),
            boundary: boundary.to_string(),
            children,
        }
    }

    fn headers(&self) -> Headers {
        match self {
            Self::Leaf { headers, .. } => headers.clone(),
            Self::Multipart { content_type, .. } => {
                let mut headers = Headers::new();
                headers.add("Content-Type", content_type.to_string());
                headers
            }
        }
    }

    fn write_body(&self, out: &mut String, eol: &str) {
        match self {
            Self::Leaf { body, .. } => out.push_str(body),
            Self::Multipart {
                boundary, children, ..
            } => {
                for child in children {
                    out.push_str("--");
                    out.push_str(boundary);
                    out.push_str(eol);
                    child.write_entity(out, eol);
                    out.push_str(eol);
                }
                out.push_str("--");
                out.push_str(boundary);
                out.push_str("--");
                out.push_str(eol);
            }
        }
    }

    fn write_entity(&self, out: &mut String, eol: &str) {
        for (name, value) in self.headers().iter() {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(eol);
        }
        out.push_str(eol);
        self.write_body(out, eol);
    }
}

/// The default [`MimeComposer`].
#[derive(Debug, Clone)]
pub struct MimeBuilder {
    options: MimeOptions,
    text_body: Option<String>,
    html_body: Option<String>,
    images: Vec<FilePart>,
    attachments: Vec<FilePart>,
    mixed_boundary: String,
    related_boundary: String,
    alternative_boundary: String,
}

impl MimeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(options: MimeOptions) -> Self {
        Self {
            options,
            text_body: None,
            html_body: None,
            images: Vec::new(),
            attachments: Vec::new(),
            mixed_boundary: boundary(),
            related_boundary: boundary(),
            alternative_boundary: boundary(),
        }
    }

    /// Returns the options this builder was created with.
    #[must_use]
    pub const fn options(&self) -> &MimeOptions {
        &self.options
    }

    /// Gives every inline image without a content ID a generated one.
    fn assign_content_ids(&mut self, domain: &str) {
        for image in self.images.iter_mut().filter(|i| i.content_id.is_none()) {
            image.content_id = Some(format!("{}@{domain}", unique_token()));
        }
    }

    /// HTML body with image references rewritten to `cid:` URLs.
    fn html_with_cids(&self, html: &str) -> String {
        let mut html = html.to_string();
        for image in &self.images {
            let (Some(cid), false) = (&image.content_id, image.filename.is_empty()) else {
                continue;
            };
            for attribute in ["src", "background", "href"] {
                for quote in ['"', '\''] {
                    let from = format!("{attribute}={quote}{}{quote}", image.filename);
                    let to = format!("{attribute}={quote}cid:{cid}{quote}");
                    html = html.replace(&from, &to);
                }
            }
        }
        html
    }

    fn text_node(&self, text: &str) -> Node {
        let encoding = self.options.text_encoding;
        let mut headers = Headers::new();
        headers.add(
            "Content-Type",
            ContentType::text_plain(&self.options.text_charset).to_string(),
        );
        headers.add("Content-Transfer-Encoding", encoding.to_string());
        Node::Leaf {
            headers,
            body: encoding.encode(text.as_bytes(), self.options.line_ending),
        }
    }

    fn html_node(&self, html: &str) -> Node {
        let encoding = self.options.html_encoding;
        let html = self.html_with_cids(html);
        let mut headers = Headers::new();
        headers.add(
            "Content-Type",
            ContentType::text_html(&self.options.html_charset).to_string(),
        );
        headers.add("Content-Transfer-Encoding", encoding.to_string());
        Node::Leaf {
            headers,
            body: encoding.encode(html.as_bytes(), self.options.line_ending),
        }
    }

    /// Builds the entity tree for the current content.
    fn structure(&self) -> Node {
        let eol = self.options.line_ending;

        let text = self.text_body.as_deref().map(|t| self.text_node(t));
        let html = self.html_body.as_deref().map(|h| self.html_node(h));

        let content = match (text, html) {
            (Some(text), Some(html)) => Some(Node::multipart(
                "alternative",
                &self.alternative_boundary,
                vec![text, html],
            )),
            (text, html) => text.or(html),
        };

        let content = match content {
            Some(content) if self.html_body.is_some() && !self.images.is_empty() => {
                let mut children = vec![content];
                children.extend(self.images.iter().map(|i| i.to_node(eol)));
                Some(Node::multipart("related", &self.related_boundary, children))
            }
            content => content,
        };

        if self.attachments.is_empty() {
            return content.unwrap_or_else(|| self.text_node(""));
        }

        let mut children: Vec<Node> = content.into_iter().collect();
        children.extend(self.attachments.iter().map(|a| a.to_node(eol)));
        Node::multipart("mixed", &self.mixed_boundary, children)
    }
}

impl Default for MimeBuilder {
    fn default() -> Self {
        Self::new(MimeOptions::default())
    }
}

impl MimeComposer for MimeBuilder {
    fn with_options(options: MimeOptions) -> Self {
        Self::new(options)
    }

    fn set_text_body(&mut self, text: &str) {
        self.text_body = Some(text.to_string());
    }

    fn set_html_body(&mut self, html: &str) {
        self.html_body = Some(html.to_string());
    }

    fn add_inline_image(
        &mut self,
        file: &str,
        content_type: &str,
        name: &str,
        is_path: bool,
        content_id: Option<&str>,
    ) -> Result<()> {
        let mut part = FilePart::load(file, content_type, name, is_path)?;
        part.disposition = Disposition::Inline;
        part.content_id = content_id.map(ToString::to_string);
        debug!(filename = %part.filename, bytes = part.data.len(), "inline image added");
        self.images.push(part);
        Ok(())
    }

    fn add_attachment(
        &mut self,
        file: &str,
        content_type: &str,
        name: &str,
        is_path: bool,
    ) -> Result<()> {
        let part = FilePart::load(file, content_type, name, is_path)?;
        debug!(filename = %part.filename, bytes = part.data.len(), "attachment added");
        self.attachments.push(part);
        Ok(())
    }

    fn render_headers(&mut self, extra: &Headers) -> String {
        let domain = extra
            .get("From")
            .map(derive_host_from_address)
            .filter(|d| !d.is_empty())
            .unwrap_or(FALLBACK_CID_DOMAIN)
            .to_string();
        self.assign_content_ids(&domain);

        if self.html_body.is_none() && !self.images.is_empty() {
            debug!(count = self.images.len(), "inline images dropped without an HTML body");
        }

        let mut headers = extra.clone();
        let mut mime_headers = Headers::new();
        mime_headers.add("MIME-Version", "1.0");
        mime_headers.merge(&self.structure().headers());
        for (name, value) in mime_headers.iter() {
            if !headers.contains(name) {
                headers.add(name, value);
            }
        }

        headers.render(self.options.line_ending)
    }

    fn render_body(&mut self) -> Vec<u8> {
        self.assign_content_ids(FALLBACK_CID_DOMAIN);

        let mut out = String::new();
        self.structure()
            .write_body(&mut out, self.options.line_ending.as_str());
        out.into_bytes()
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
    use crate::encoding::{decode_base64, decode_quoted_printable, decode_rfc2047};
    use std::io::Write;

    fn builder() -> MimeBuilder {
        MimeBuilder::new(MimeOptions::new(LineEnding::CrLf))
    }

    fn render(builder: &mut MimeBuilder, extra: &Headers) -> (Headers, String) {
        let headers = Headers::parse(&builder.render_headers(extra));
        let body = String::from_utf8(builder.render_body()).unwrap();
        (headers, body)
    }

    #[test]
    fn test_text_only() {
        let mut builder = builder();
        builder.set_text_body("Hello, World!");

        let (headers, body) = render(&mut builder, &Headers::new());
        assert_eq!(headers.get("MIME-Version"), Some("1.0"));
        assert_eq!(headers.get("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(headers.get("Content-Transfer-Encoding"), Some("base64"));
        assert_eq!(decode_base64(&body).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_html_only_quoted_printable() {
        let mut builder = builder();
        builder.set_html_body("<p>Grüße</p>");

        let (headers, body) = render(&mut builder, &Headers::new());
        assert_eq!(headers.get("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(headers.get("Content-Transfer-Encoding"), Some("quoted-printable"));
        assert_eq!(decode_quoted_printable(&body).unwrap(), "<p>Grüße</p>");
    }

    #[test]
    fn test_empty_message_is_empty_text() {
        let mut builder = builder();
        let (headers, body) = render(&mut builder, &Headers::new());
        assert_eq!(headers.get("Content-Type"), Some("text/plain; charset=utf-8"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_text_and_html_alternative() {
        let mut builder = builder();
        builder.set_text_body("plain");
        builder.set_html_body("<b>html</b>");

        let (headers, body) = render(&mut builder, &Headers::new());
        let ct = ContentType::parse(headers.get("Content-Type").unwrap()).unwrap();
        assert_eq!(ct.sub_type, "alternative");
        assert!(!headers.contains("Content-Transfer-Encoding"));

        let boundary = ct.boundary().unwrap();
        assert_eq!(body.matches(&format!("--{boundary}\r\n")).count(), 2);
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));

        let text_at = body.find("text/plain").unwrap();
        let html_at = body.find("text/html").unwrap();
        assert!(text_at < html_at);
    }

    #[test]
    fn test_inline_image_related_with_cid_rewrite() {
        let mut builder = builder();
        builder.set_html_body("<img src=\"logo.png\">");
        builder
            .add_inline_image("PNGDATA", "image/png", "logo.png", false, None)
            .unwrap();

        let extra: Headers = [("From", "=?UTF-8?B?QQ==?= <a@shop.example>")]
            .into_iter()
            .collect();
        let (headers, body) = render(&mut builder, &extra);

        let ct = ContentType::parse(headers.get("Content-Type").unwrap()).unwrap();
        assert_eq!(ct.sub_type, "related");
        assert!(body.contains("Content-Disposition: inline; filename=\"logo.png\""));
        assert!(body.contains("Content-Type: image/png; name=logo.png"));

        let cid_line = body
            .lines()
            .find(|l| l.starts_with("Content-ID: "))
            .unwrap();
        let cid = cid_line
            .trim_start_matches("Content-ID: <")
            .trim_end_matches('>');
        assert!(cid.ends_with("@shop.example"));
        assert!(body.contains(&format!("src=3D\"cid:{cid}\"")));
    }

    #[test]
    fn test_explicit_content_id_kept() {
        let mut builder = builder();
        builder.set_html_body("<img src=\"cid:banner\">");
        builder
            .add_inline_image("GIF89a", "image/gif", "", false, Some("banner"))
            .unwrap();

        let (_, body) = render(&mut builder, &Headers::new());
        assert!(body.contains("Content-ID: <banner>\r\n"));
        assert!(body.contains("Content-Disposition: inline\r\n"));
    }

    #[test]
    fn test_content_id_fallback_domain() {
        let mut builder = builder();
        builder.set_html_body("<img src=\"x.png\">");
        builder
            .add_inline_image("data", "image/png", "x.png", false, None)
            .unwrap();

        let body = String::from_utf8(builder.render_body()).unwrap();
        assert!(body.contains("@localhost>"));
    }

    #[test]
    fn test_inline_images_dropped_without_html() {
        let mut builder = builder();
        builder.set_text_body("no html");
        builder
            .add_inline_image("data", "image/png", "x.png", false, None)
            .unwrap();

        let (headers, body) = render(&mut builder, &Headers::new());
        assert_eq!(headers.get("Content-Type"), Some("text/plain; charset=utf-8"));
        assert!(!body.contains("image/png"));
    }

    #[test]
    fn test_attachments_mixed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let basename = file
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();

        let mut builder = builder();
        builder.set_text_body("see attached");
        builder.set_html_body("<p>see attached</p>");
        builder
            .add_attachment(&path, "application/pdf", "", true)
            .unwrap();
        builder
            .add_attachment("inline text", "text/plain", "note.txt", false)
            .unwrap();

        let (headers, body) = render(&mut builder, &Headers::new());
        let ct = ContentType::parse(headers.get("Content-Type").unwrap()).unwrap();
        assert_eq!(ct.sub_type, "mixed");
        assert!(body.contains("multipart/alternative"));
        assert!(body.contains(&format!("attachment; filename=\"{basename}\"")));
        assert!(body.contains("attachment; filename=\"note.txt\""));
        assert!(body.contains(&crate::encoding::encode_base64(b"%PDF-1.4 test")));
    }

    #[test]
    fn test_attachment_invalid_content_type_defaults() {
        let mut builder = builder();
        builder
            .add_attachment("data", "not a type", "blob.bin", false)
            .unwrap();

        let (_, body) = render(&mut builder, &Headers::new());
        assert!(body.contains("Content-Type: application/octet-stream; name=blob.bin"));
    }

    #[test]
    fn test_attachment_non_ascii_filename_encoded() {
        let mut builder = builder();
        builder
            .add_attachment("data", "text/plain", "отчёт.txt", false)
            .unwrap();

        let (_, body) = render(&mut builder, &Headers::new());
        assert!(body.contains("filename=\"=?UTF-8?B?"));
    }

    #[test]
    fn test_attachment_names_cannot_break_part_headers() {
        let mut builder = builder();
        builder
            .add_attachment("data", "text/plain", "say \"hi\".txt", false)
            .unwrap();
        builder
            .add_attachment("data", "text/plain", "evil.txt\r\nX-Injected: yes", false)
            .unwrap();

        let (_, body) = render(&mut builder, &Headers::new());
        assert!(!body.contains("say \"hi\""));
        assert!(!body.lines().any(|line| line.starts_with("X-Injected")));

        let names: Vec<String> = body
            .lines()
            .filter_map(|line| line.strip_prefix("Content-Disposition: attachment; filename="))
            .map(|value| decode_rfc2047(value.trim_matches('"')).unwrap())
            .collect();
        assert_eq!(names, vec!["say \"hi\".txt", "evil.txt\r\nX-Injected: yes"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut builder = builder();
        let err = builder
            .add_attachment("/nonexistent/file.pdf", "application/pdf", "", true)
            .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(builder.attachments.is_empty());
    }

    #[test]
    fn test_extra_headers_take_precedence() {
        let mut builder = builder();
        builder.set_text_body("x");

        let extra: Headers = [
            ("From", "<noreply@example.com>"),
            ("Return-Path", ""),
            ("MIME-Version", "1.1"),
        ]
        .into_iter()
        .collect();
        let rendered = builder.render_headers(&extra);

        assert!(rendered.starts_with("From: <noreply@example.com>\r\n"));
        assert!(!rendered.contains("Return-Path"));
        let headers = Headers::parse(&rendered);
        assert_eq!(headers.get_all("MIME-Version"), vec!["1.1"]);
    }

    #[test]
    fn test_lf_line_endings() {
        let mut builder = MimeBuilder::new(MimeOptions::new(LineEnding::Lf));
        builder.set_text_body("a");
        builder.set_html_body("b");

        let headers = builder.render_headers(&Headers::new());
        let body = String::from_utf8(builder.render_body()).unwrap();
        assert!(!headers.contains('\r'));
        assert!(!body.contains('\r'));
    }
}
