//! # mailsend
//!
//! Composes multipart email (plain text, HTML, inline images, attachments)
//! and hands it to a local transfer agent.
//!
//! This crate provides:
//! - [`MailMessage`]: a reusable builder that resets itself after every send
//! - [`Composition`] and [`compose`]: the same rendering as a plain value
//!   and a stateless function
//! - RFC 2047 encoded sender/recipient names and subjects
//! - [`MailerConfig`]: JSON configuration for sendmail delivery
//!
//! ## Quick Start
//!
//! ```
//! use mailsend::{Attachment, FileRecord, LineEnding, MailMessage, MailSender};
//! use mailsend_transport::StubTransport;
//!
//! let mut mailer = MailMessage::new("example.com", LineEnding::CrLf, StubTransport::new());
//! mailer.set_from("shop@example.com");
//! mailer.set_sender("Example Shop");
//! mailer.set_recipient("Jane Doe");
//!
//! mailer
//!     .send(
//!         "jane@example.org",
//!         "Your order",
//!         Some("<p>Thanks!</p>"),
//!         Some("Thanks!"),
//!         &[],
//!         &[Attachment::from(FileRecord::new("Order #42").name("order.txt").data())],
//!     )
//!     .unwrap();
//!
//! assert_eq!(mailer.transport().sent().len(), 1);
//! assert!(mailer.from().is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
mod compose;
mod config;
mod error;
pub mod header;
mod message;
mod sender;

pub use attachment::{Attachment, FileRecord, InlineImage, ResolvedFile};
pub use compose::{ComposedMessage, Composition, compose};
pub use config::MailerConfig;
pub use error::{Error, Result};
pub use header::encode;
pub use mailsend_mime::{LineEnding, derive_host_from_address};
pub use message::MailMessage;
pub use sender::MailSender;
