//! Writes messages to `.eml` files instead of delivering them.

use crate::error::Result;
use crate::transport::{Transport, assemble};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

/// Stores each message as `<random>.eml` in a directory.
#[derive(Debug, Clone)]
pub struct FileTransport {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileTransport {
    /// Creates a transport writing into `dir`, which must exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, oldest first.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Transport for FileTransport {
    fn send(&mut self, recipient: &str, headers: &str, body: &[u8]) -> Result<()> {
        let id: u128 = rand::thread_rng().r#gen();
        let path = self.dir.join(format!("{id:032x}.eml"));

        std::fs::write(&path, assemble(headers, body))?;
        info!(recipient, path = %path.display(), "message written");

        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_eml_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut transport = FileTransport::new(dir.path());

        transport.send("a@x.com", "Subject: one\r\n", b"first").unwrap();
        transport.send("b@x.com", "Subject: two\r\n", b"second").unwrap();

        assert_eq!(transport.written().len(), 2);
        let first = std::fs::read_to_string(&transport.written()[0]).unwrap();
        assert_eq!(first, "Subject: one\r\n\r\nfirst");
        assert!(transport.written()[1].extension().is_some_and(|e| e == "eml"));
    }

    #[test]
    fn test_missing_directory() {
        let mut transport = FileTransport::new("/nonexistent/outbox");
        assert!(transport.send("a@x.com", "Subject: x\n", b"").is_err());
        assert!(transport.written().is_empty());
    }
}
