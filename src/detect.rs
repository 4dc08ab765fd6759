//! Upload format classification and magic-byte sniffing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Media type declared for PDF uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
/// Media type of legacy binary Word documents.
pub const DOC_MEDIA_TYPE: &str = "application/msword";
/// Media type of Office Open XML Word documents.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extraction path chosen for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Word,
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Word => write!(f, "Word"),
        }
    }
}

/// Decide the extraction path from a file name and declared media type.
///
/// PDF signals are checked first (`.pdf` extension or the PDF media type),
/// then Word signals (`.doc`/`.docx` extension or a media type containing
/// `word`). The first match wins.
///
/// # Example
/// ```
/// use arextract::detect::{classify, DocumentFormat};
///
/// assert_eq!(classify("lesson.PDF", "").unwrap(), DocumentFormat::Pdf);
/// assert_eq!(classify("upload", "application/msword").unwrap(), DocumentFormat::Word);
/// assert!(classify("notes.txt", "text/plain").is_err());
/// ```
pub fn classify(name: &str, media_type: &str) -> Result<DocumentFormat> {
    let name = name.to_lowercase();

    if name.ends_with(".pdf") || media_type == PDF_MEDIA_TYPE {
        return Ok(DocumentFormat::Pdf);
    }

    if name.ends_with(".doc") || name.ends_with(".docx") || media_type.contains("word") {
        return Ok(DocumentFormat::Word);
    }

    Err(Error::UnsupportedFormat {
        media_type: media_type.to_string(),
    })
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Guess a media type from the leading bytes of a file.
///
/// Only used when the uploader declared nothing; it never overrides an
/// explicit declaration. ZIP containers are assumed to be DOCX.
pub fn sniff_media_type(data: &[u8]) -> Option<&'static str> {
    if is_pdf_bytes(data) {
        Some(PDF_MEDIA_TYPE)
    } else if data.starts_with(ZIP_MAGIC) {
        Some(DOCX_MEDIA_TYPE)
    } else if data.starts_with(OLE2_MAGIC) {
        Some(DOC_MEDIA_TYPE)
    } else {
        None
    }
}

/// Check if bytes start with a valid PDF header (`%PDF-x.y`).
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return false;
    }

    let version = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit()
}
