//! Inline image and attachment entries as callers pass them to `send`.
//!
//! An entry is either a bare path or a [`FileRecord`]. Records deserialize
//! from objects keyed `file`, `c_type`, `name`, `isfile` and `cid`. A record
//! without `file` resolves to nothing and is skipped.

use mailsend_mime::DEFAULT_CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detailed description of an image or attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path of the file, or its data when `is_file` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// MIME type, `application/octet-stream` if unset.
    #[serde(default, rename = "c_type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Display name, empty if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether `file` is a path; true if unset.
    #[serde(default, rename = "isfile", skip_serializing_if = "Option::is_none")]
    pub is_file: Option<bool>,
    /// Content ID for inline images.
    #[serde(default, rename = "cid", skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

impl FileRecord {
    /// Creates a record for a file path.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks `file` as literal data rather than a path.
    #[must_use]
    pub fn data(mut self) -> Self {
        self.is_file = Some(false);
        self
    }

    /// Sets the content ID.
    #[must_use]
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    fn resolve(&self, with_content_id: bool) -> Option<ResolvedFile> {
        let file = self.file.clone()?;
        Some(ResolvedFile {
            file,
            content_type: self
                .content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            name: self.name.clone().unwrap_or_default(),
            is_path: self.is_file.unwrap_or(true),
            content_id: if with_content_id {
                self.content_id.clone()
            } else {
                None
            },
        })
    }
}

/// Builder arguments for one image or attachment, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Path or data.
    pub file: String,
    /// MIME type.
    pub content_type: String,
    /// Display name.
    pub name: String,
    /// Whether `file` is a path.
    pub is_path: bool,
    /// Content ID, inline images only.
    pub content_id: Option<String>,
}

/// An image referenced from the HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineImage {
    /// Path of the image; its base name becomes the content ID.
    Path(String),
    /// Detailed record.
    Record(FileRecord),
}

impl InlineImage {
    /// Applies defaults; `None` for a record without `file`.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedFile> {
        match self {
            Self::Path(path) => Some(ResolvedFile {
                file: path.clone(),
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                name: String::new(),
                is_path: true,
                content_id: Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned()),
            }),
            Self::Record(record) => record.resolve(true),
        }
    }
}

impl From<&str> for InlineImage {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for InlineImage {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<FileRecord> for InlineImage {
    fn from(record: FileRecord) -> Self {
        Self::Record(record)
    }
}

/// A file attached to the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attachment {
    /// Path of the file, attached with default type and name.
    Path(String),
    /// Detailed record.
    Record(FileRecord),
}

impl Attachment {
    /// Applies defaults; `None` for a record without `file`.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedFile> {
        match self {
            Self::Path(path) => Some(ResolvedFile {
                file: path.clone(),
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                name: String::new(),
                is_path: true,
                content_id: None,
            }),
            Self::Record(record) => record.resolve(false),
        }
    }
}

impl From<&str> for Attachment {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for Attachment {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<FileRecord> for Attachment {
    fn from(record: FileRecord) -> Self {
        Self::Record(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults() {
        let image = InlineImage::from(FileRecord::new("img.png"));
        let resolved = image.resolve().unwrap();
        assert_eq!(resolved.file, "img.png");
        assert_eq!(resolved.content_type, "application/octet-stream");
        assert_eq!(resolved.name, "");
        assert!(resolved.is_path);
        assert_eq!(resolved.content_id, None);
    }

    #[test]
    fn test_record_without_file_is_skipped() {
        let image = InlineImage::Record(FileRecord {
            name: Some("orphan".to_string()),
            ..FileRecord::default()
        });
        assert!(image.resolve().is_none());
        assert!(Attachment::Record(FileRecord::default()).resolve().is_none());
    }

    #[test]
    fn test_bare_image_path_uses_base_name_as_cid() {
        let resolved = InlineImage::from("/var/www/img/logo.png").resolve().unwrap();
        assert_eq!(resolved.content_id.as_deref(), Some("logo.png"));
        assert_eq!(resolved.content_type, "application/octet-stream");
        assert!(resolved.is_path);
    }

    #[test]
    fn test_attachment_record_passes_fields_through() {
        let attachment = Attachment::from(
            FileRecord::new("hello")
                .content_type("text/plain")
                .name("hello.txt")
                .data()
                .content_id("ignored"),
        );
        let resolved = attachment.resolve().unwrap();
        assert_eq!(resolved.content_type, "text/plain");
        assert_eq!(resolved.name, "hello.txt");
        assert!(!resolved.is_path);
        assert_eq!(resolved.content_id, None);
    }

    #[test]
    fn test_deserialize_mixed_list() {
        let json = r#"[
            "/tmp/report.pdf",
            {
                "file": "/tmp/a.png",
                "c_type": "image/png",
                "name": "a.png",
                "isfile": true,
                "cid": "a"
            },
            {"c_type": "image/gif"}
        ]"#;
        let images: Vec<InlineImage> = serde_json::from_str(json).unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(images[0], InlineImage::Path("/tmp/report.pdf".to_string()));

        let resolved: Vec<ResolvedFile> = images.iter().filter_map(InlineImage::resolve).collect();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].content_id.as_deref(), Some("a"));
        assert_eq!(resolved[1].content_type, "image/png");
    }
}
