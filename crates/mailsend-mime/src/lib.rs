//! # mailsend-mime
//!
//! MIME encoding primitives and a multipart builder for outgoing email.
//!
//! ## Features
//!
//! - **Message generation**: text, HTML, inline images and attachments
//!   assembled into `multipart/alternative`, `related` and `mixed` parts
//! - **Encoding/Decoding**: Base64, Quoted-Printable, RFC 2047 header encoding
//! - **Headers**: ordered, case-insensitive, last write wins
//! - **Content types**: parsing and rendering with parameters
//!
//! ## Quick Start
//!
//! ```
//! use mailsend_mime::{Headers, LineEnding, MimeBuilder, MimeComposer, MimeOptions};
//!
//! let mut mime = MimeBuilder::new(MimeOptions::new(LineEnding::CrLf));
//! mime.set_text_body("Plain text version");
//! mime.set_html_body("<h1>HTML version</h1>");
//!
//! let mut extra = Headers::new();
//! extra.set("From", "<sender@example.com>");
//! extra.set("Subject", "Test");
//!
//! let headers = mime.render_headers(&extra);
//! let body = mime.render_body();
//! assert!(headers.contains("multipart/alternative"));
//! assert!(!body.is_empty());
//! ```
//!
//! ### Encoding/Decoding
//!
//! ```
//! use mailsend_mime::encoding::{decode_rfc2047, encode_rfc2047_word};
//!
//! let encoded = encode_rfc2047_word("Héllo", "UTF-8");
//! assert_eq!(decode_rfc2047(&encoded).unwrap(), "Héllo");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod builder;
mod content_type;
mod error;
mod header;
mod options;

pub mod encoding;
pub mod id;

pub use address::derive_host_from_address;
pub use builder::{MimeBuilder, MimeComposer};
pub use content_type::{ContentType, DEFAULT_CONTENT_TYPE};
pub use error::{Error, Result};
pub use header::Headers;
pub use options::{LineEnding, MimeOptions, TransferEncoding};
