//! # mailsend-transport
//!
//! Hands finished messages to a delivery agent.
//!
//! - [`SendmailTransport`]: pipes the message into a local
//!   sendmail-compatible binary
//! - [`FileTransport`]: writes `.eml` files into a directory
//! - [`StubTransport`]: records messages in memory
//!
//! ## Quick Start
//!
//! ```
//! use mailsend_transport::{StubTransport, Transport};
//!
//! let mut transport = StubTransport::new();
//! transport
//!     .send("user@example.com", "Subject: Test\r\n", b"Hello, World!")
//!     .unwrap();
//! assert_eq!(transport.sent().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod file;
mod sendmail;
mod stub;
mod transport;

pub use error::{Error, Result};
pub use file::FileTransport;
pub use sendmail::{DEFAULT_SENDMAIL_PATH, SendmailConfig, SendmailTransport};
pub use stub::{SentMessage, StubTransport};
pub use transport::{Transport, assemble, line_ending_of};
