//! Turning one message description into a header block and a body.

use crate::attachment::{Attachment, InlineImage};
use crate::header::{
    default_headers, from_header, recipient_header, return_path_header, subject_header,
};
use mailsend_mime::{Headers, MimeComposer, MimeOptions};
use tracing::{debug, warn};

/// Everything needed to render one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    /// Address the message is sent to.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: Option<String>,
    /// Plain-text body.
    pub text_body: Option<String>,
    /// Images referenced from the HTML body.
    pub inline_images: Vec<InlineImage>,
    /// Attached files.
    pub attachments: Vec<Attachment>,
    /// Sender address, `noreply@<host>` if unset.
    pub from: Option<String>,
    /// Sender display name.
    pub sender_name: Option<String>,
    /// Recipient display name.
    pub recipient_name: Option<String>,
    /// Return path; no `Return-Path` header is produced if unset.
    pub return_path: Option<String>,
}

impl Composition {
    /// Creates a composition with a recipient and subject.
    #[must_use]
    pub fn new(recipient: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    /// Adds an inline image.
    #[must_use]
    pub fn inline_image(mut self, image: impl Into<InlineImage>) -> Self {
        self.inline_images.push(image.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: impl Into<Attachment>) -> Self {
        self.attachments.push(attachment.into());
        self
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from_address(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Sets the recipient display name.
    #[must_use]
    pub fn recipient_name(mut self, name: impl Into<String>) -> Self {
        self.recipient_name = Some(name.into());
        self
    }

    /// Sets the return path.
    #[must_use]
    pub fn return_path(mut self, return_path: impl Into<String>) -> Self {
        self.return_path = Some(return_path.into());
        self
    }

    /// The `From`, `Return-Path`, `To` and `Subject` headers.
    #[must_use]
    pub fn address_headers(&self, host: &str) -> Headers {
        let sender_name = self.sender_name.as_deref();
        let mut headers = Headers::new();
        headers.set("From", from_header(sender_name, self.from.as_deref(), host));
        headers.set(
            "Return-Path",
            return_path_header(sender_name, self.return_path.as_deref(), host),
        );
        headers.set(
            "To",
            recipient_header(self.recipient_name.as_deref(), &self.recipient),
        );
        headers.set("Subject", subject_header(&self.subject));
        headers
    }
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// Envelope recipient.
    pub recipient: String,
    /// Full header block, every line terminated.
    pub headers: String,
    /// Serialized MIME body.
    pub body: Vec<u8>,
}

/// Renders `composition` with fresh `Date`, `X-Priority` and `Message-ID`
/// headers.
#[must_use]
pub fn compose<M: MimeComposer>(
    host: &str,
    options: MimeOptions,
    composition: &Composition,
) -> ComposedMessage {
    compose_with_headers::<M>(host, options, default_headers(host), composition)
}

/// Renders `composition` on top of `headers`.
///
/// Records without a file and files that cannot be read are skipped.
pub(crate) fn compose_with_headers<M: MimeComposer>(
    host: &str,
    options: MimeOptions,
    mut headers: Headers,
    composition: &Composition,
) -> ComposedMessage {
    let mut mime = M::with_options(options);

    if let Some(text) = &composition.text_body {
        mime.set_text_body(text);
    }
    if let Some(html) = &composition.html_body {
        mime.set_html_body(html);
    }

    for image in &composition.inline_images {
        let Some(image) = image.resolve() else {
            debug!("skipping inline image record without file");
            continue;
        };
        if let Err(e) = mime.add_inline_image(
            &image.file,
            &image.content_type,
            &image.name,
            image.is_path,
            image.content_id.as_deref(),
        ) {
            warn!(error = %e, "inline image skipped");
        }
    }

    for attachment in &composition.attachments {
        let Some(attachment) = attachment.resolve() else {
            debug!("skipping attachment record without file");
            continue;
        };
        if let Err(e) = mime.add_attachment(
            &attachment.file,
            &attachment.content_type,
            &attachment.name,
            attachment.is_path,
        ) {
            warn!(error = %e, "attachment skipped");
        }
    }

    headers.merge(&composition.address_headers(host));
    let rendered_headers = mime.render_headers(&headers);
    let body = mime.render_body();

    ComposedMessage {
        recipient: composition.recipient.clone(),
        headers: rendered_headers,
        body,
    }
}
