//! The uploaded file.

use std::path::Path;

use crate::detect::sniff_media_type;
use crate::error::Result;

/// An uploaded file: raw bytes plus the name and media type the uploader
/// declared.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    media_type: String,
    data: Vec<u8>,
}

impl SourceDocument {
    /// Create a document from in-memory bytes.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Read a file from disk.
    ///
    /// The media type is sniffed from the leading bytes; it stays empty
    /// when the content is not recognised, leaving the decision to the
    /// file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = sniff_media_type(&data).unwrap_or_default();
        Ok(Self::new(name, media_type, data))
    }

    /// Replace the declared media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Declared file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type (may be empty).
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size of the upload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the upload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
