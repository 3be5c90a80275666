//! The sending capability.

use crate::attachment::{Attachment, InlineImage};
use crate::error::Result;

/// Something that can compose and send an email.
pub trait MailSender {
    /// Composes a multipart message for `email` and sends it.
    ///
    /// `html_body` and `text_body` may both be given, producing a
    /// `multipart/alternative` message. Inline images are only included
    /// with an HTML body. Image and attachment records without a file are
    /// skipped, as are files that cannot be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the message.
    fn send(
        &mut self,
        email: &str,
        subject: &str,
        html_body: Option<&str>,
        text_body: Option<&str>,
        inline_images: &[InlineImage],
        attachments: &[Attachment],
    ) -> Result<()>;
}
