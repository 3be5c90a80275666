//! The reusable message builder.

use crate::attachment::{Attachment, InlineImage};
use crate::compose::{Composition, compose_with_headers};
use crate::config::MailerConfig;
use crate::error::{Error, Result};
use crate::header::{default_headers, from_header, recipient_header, return_path_header};
use crate::sender::MailSender;
use mailsend_mime::{Headers, LineEnding, MimeBuilder, MimeComposer, MimeOptions};
use mailsend_transport::{SendmailTransport, Transport};
use std::marker::PhantomData;
use tracing::{info, warn};

/// Builder state for messages sent from one host.
///
/// Sender, recipient and return-path fields are set before a call to
/// [`send`](MailSender::send) and are consumed by it: every send leaves the
/// builder as it was right after construction, with fresh default headers.
///
/// The builder is not meant to be shared. Callers sending from several
/// threads need one instance each or their own locking.
///
/// `M` is the MIME composer used for every message, `T` the transport.
#[derive(Debug)]
pub struct MailMessage<T, M = MimeBuilder> {
    host: String,
    line_ending: LineEnding,
    headers: Headers,
    from: Option<String>,
    sender_name: Option<String>,
    to: Option<String>,
    recipient_name: Option<String>,
    return_path: Option<String>,
    transport: T,
    composer: PhantomData<fn() -> M>,
}

impl MailMessage<SendmailTransport> {
    /// Creates a builder that delivers through the configured sendmail.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &MailerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.host.clone(),
            config.line_ending,
            SendmailTransport::with_config(config.sendmail.clone()),
        ))
    }
}

impl<T: Transport> MailMessage<T> {
    /// Creates a builder for `host` composing with [`MimeBuilder`].
    #[must_use]
    pub fn new(host: impl Into<String>, line_ending: LineEnding, transport: T) -> Self {
        Self::with_composer(host, line_ending, transport)
    }
}

impl<T: Transport, M: MimeComposer> MailMessage<T, M> {
    /// Creates a builder for `host` composing with `M`.
    #[must_use]
    pub fn with_composer(host: impl Into<String>, line_ending: LineEnding, transport: T) -> Self {
        let host = host.into();
        Self {
            headers: default_headers(&host),
            host,
            line_ending,
            from: None,
            sender_name: None,
            to: None,
            recipient_name: None,
            return_path: None,
            transport,
            composer: PhantomData,
        }
    }

    /// Sets the sender address.
    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = Some(from.into());
    }

    /// Sets the sender display name.
    pub fn set_sender(&mut self, sender_name: impl Into<String>) {
        self.sender_name = Some(sender_name.into());
    }

    /// Sets the recipient address.
    ///
    /// This is kept for callers that track it; the `To` header always uses
    /// the address given to `send`.
    pub fn set_to(&mut self, to: impl Into<String>) {
        self.to = Some(to.into());
    }

    /// Sets the recipient display name.
    pub fn set_recipient(&mut self, recipient_name: impl Into<String>) {
        self.recipient_name = Some(recipient_name.into());
    }

    /// Sets the return path.
    pub fn set_return_path(&mut self, return_path: impl Into<String>) {
        self.return_path = Some(return_path.into());
    }

    /// Host used for default addresses and message IDs.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Line ending handed to the MIME composer.
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Headers the next message starts from.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Sender address, if set.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Sender display name, if set.
    #[must_use]
    pub fn sender_name(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }

    /// Recipient address, if set.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Recipient display name, if set.
    #[must_use]
    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    /// Return path, if set.
    #[must_use]
    pub fn return_path(&self) -> Option<&str> {
        self.return_path.as_deref()
    }

    /// The transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// `From` header for the current state.
    #[must_use]
    pub fn build_from_header(&self) -> String {
        from_header(self.sender_name(), self.from(), &self.host)
    }

    /// `Return-Path` header for the current state; empty if none is set.
    #[must_use]
    pub fn build_return_path_header(&self) -> String {
        return_path_header(self.sender_name(), self.return_path(), &self.host)
    }

    /// `To` header for a message sent to `recipient`.
    #[must_use]
    pub fn build_recipient_header(&self, recipient: &str) -> String {
        recipient_header(self.recipient_name(), recipient)
    }

    /// Clears addresses and names and recomputes the default headers.
    pub fn reset_state(&mut self) {
        self.from = None;
        self.to = None;
        self.sender_name = None;
        self.recipient_name = None;
        self.return_path = None;
        self.headers = default_headers(&self.host);
    }

    /// Base64 text and quoted-printable HTML, both UTF-8.
    fn mime_options(&self) -> MimeOptions {
        MimeOptions::new(self.line_ending)
    }

    /// Composes and sends a message described by `composition`.
    ///
    /// Addresses and names missing from `composition` are taken from the
    /// builder state. The state is reset afterwards, whether or not the
    /// transport accepted the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the message.
    pub fn send_composition(&mut self, mut composition: Composition) -> Result<()> {
        composition.from = composition.from.or_else(|| self.from.take());
        composition.sender_name = composition.sender_name.or_else(|| self.sender_name.take());
        composition.recipient_name = composition
            .recipient_name
            .or_else(|| self.recipient_name.take());
        composition.return_path = composition.return_path.or_else(|| self.return_path.take());

        let headers = std::mem::take(&mut self.headers);
        let message =
            compose_with_headers::<M>(&self.host, self.mime_options(), headers, &composition);
        let result = self
            .transport
            .send(&message.recipient, &message.headers, &message.body);
        self.reset_state();

        match result {
            Ok(()) => {
                info!(recipient = %message.recipient, "message sent");
                Ok(())
            }
            Err(e) => {
                warn!(recipient = %message.recipient, error = %e, "message not sent");
                Err(Error::Transport(e))
            }
        }
    }
}

impl<T: Transport, M: MimeComposer> MailSender for MailMessage<T, M> {
    fn send(
        &mut self,
        email: &str,
        subject: &str,
        html_body: Option<&str>,
        text_body: Option<&str>,
        inline_images: &[InlineImage],
        attachments: &[Attachment],
    ) -> Result<()> {
        let composition = Composition {
            recipient: email.to_string(),
            subject: subject.to_string(),
            html_body: html_body.map(ToString::to_string),
            text_body: text_body.map(ToString::to_string),
            inline_images: inline_images.to_vec(),
            attachments: attachments.to_vec(),
            ..Composition::default()
        };
        self.send_composition(composition)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsend_transport::StubTransport;

    fn mailer() -> MailMessage<StubTransport> {
        MailMessage::new("example.com", LineEnding::CrLf, StubTransport::new())
    }

    fn assert_default_state(mailer: &MailMessage<StubTransport>) {
        let names: Vec<&str> = mailer.headers().iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Date", "X-Priority", "Message-ID"]);
        assert!(mailer.from().is_none());
        assert!(mailer.sender_name().is_none());
        assert!(mailer.to().is_none());
        assert!(mailer.recipient_name().is_none());
        assert!(mailer.return_path().is_none());
    }

    #[test]
    fn test_new_has_default_headers() {
        let mailer = mailer();
        assert_eq!(mailer.host(), "example.com");
        assert_default_state(&mailer);
        assert_eq!(mailer.headers().get("X-Priority"), Some("3 (Normal)"));
    }

    #[test]
    fn test_build_from_header_default() {
        assert_eq!(mailer().build_from_header(), "<noreply@example.com>");
    }

    #[test]
    fn test_build_from_header_with_sender() {
        let mut mailer = mailer();
        mailer.set_sender("A");
        mailer.set_from("a@x.com");
        assert_eq!(mailer.build_from_header(), "=?UTF-8?B?QQ==?= <a@x.com>");
    }

    #[test]
    fn test_setters_overwrite() {
        let mut mailer = mailer();
        mailer.set_from("first@x.com");
        mailer.set_from("second@x.com");
        mailer.set_to("someone@y.com");
        assert_eq!(mailer.from(), Some("second@x.com"));
        assert_eq!(mailer.to(), Some("someone@y.com"));
    }

    #[test]
    fn test_return_path_header() {
        let mut mailer = mailer();
        assert_eq!(mailer.build_return_path_header(), "");
        mailer.set_sender("A");
        mailer.set_return_path("bounce@x.com");
        assert_eq!(mailer.build_return_path_header(), "=?UTF-8?B?QQ==?= <bounce@x.com>");
    }

    #[test]
    fn test_reset_state_recomputes_headers() {
        let mut mailer = mailer();
        let first_id = mailer.headers().get("Message-ID").unwrap().to_string();
        mailer.set_from("a@x.com");
        mailer.set_sender("A");
        mailer.set_to("b@y.com");
        mailer.set_recipient("B");
        mailer.set_return_path("r@x.com");

        mailer.reset_state();

        assert_default_state(&mailer);
        assert_ne!(mailer.headers().get("Message-ID").unwrap(), first_id);
    }

    #[test]
    fn test_send_resets_state() {
        let mut mailer = mailer();
        mailer.set_from("a@x.com");
        mailer.set_sender("A");
        mailer.set_recipient("B");
        mailer.set_return_path("r@x.com");

        mailer
            .send("b@y.com", "Hello", None, Some("text"), &[], &[])
            .unwrap();

        assert_default_state(&mailer);
        assert_eq!(mailer.transport().sent().len(), 1);
    }

    #[test]
    fn test_send_resets_state_on_failure() {
        let mut mailer: MailMessage<StubTransport> =
            MailMessage::new("example.com", LineEnding::Lf, StubTransport::failing("down"));
        mailer.set_from("a@x.com");

        let err = mailer
            .send("b@y.com", "Hello", None, Some("text"), &[], &[])
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_default_state(&mailer);
    }

    #[test]
    fn test_send_composition_prefers_explicit_fields() {
        let mut mailer = mailer();
        mailer.set_from("state@x.com");
        mailer.set_sender("State");

        mailer
            .send_composition(
                Composition::new("b@y.com", "Hi")
                    .from_address("explicit@x.com")
                    .text("body"),
            )
            .unwrap();

        let sent = &mailer.transport().sent()[0];
        let headers = Headers::parse(&sent.headers);
        assert_eq!(
            headers.get("From"),
            Some("=?UTF-8?B?U3RhdGU=?= <explicit@x.com>")
        );
        assert_default_state(&mailer);
    }
}
