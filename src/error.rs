//! Error types for arextract.
//!
//! Every message is an Arabic sentence that can be shown to the uploader
//! as-is. Use [`Error::kind`] to branch on the failure without parsing text.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for arextract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning an upload into text.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither the file extension nor the declared media type is PDF or Word.
    #[error("نوع الملف غير مدعوم: {media_type}. يرجى رفع ملف PDF أو Word.")]
    UnsupportedFormat {
        /// The media type the uploader declared (may be empty).
        media_type: String,
    },

    /// The bytes could not be parsed as the detected format.
    #[error("فشل في استخراج النص من المستند: {0}")]
    CorruptDocument(String),

    /// No OCR service credential is configured.
    #[error("خدمة التعرف الضوئي على الحروف غير مهيأة")]
    OcrUnavailable,

    /// The OCR service reported a processing failure.
    #[error("فشلت خدمة التعرف الضوئي على الحروف: {0}")]
    OcrService(String),

    /// The OCR service did not answer within the per-page budget.
    #[error("انتهت مهلة التعرف الضوئي على الحروف بعد {} ثانية", .0.as_secs_f32())]
    OcrTimeout(Duration),

    /// A single page has malformed content.
    #[error("تعذر استخراج نص الصفحة {page}: {reason}")]
    PageExtraction {
        /// 1-based page number.
        page: u32,
        /// Parser message.
        reason: String,
    },

    /// The caller cancelled the extraction between pages.
    #[error("تم إلغاء عملية الاستخراج")]
    Cancelled,

    /// Rendering or encoding a page image failed.
    #[error("تعذر تحويل الصفحة إلى صورة: {0}")]
    Image(String),

    /// I/O error when reading the upload or a configuration file.
    #[error("خطأ في القراءة أو الكتابة: {0}")]
    Io(#[from] io::Error),

    /// Transport failure talking to the OCR service.
    #[error("خطأ في الاتصال بخدمة التعرف الضوئي: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration (correction table, options).
    #[error("إعدادات غير صالحة: {0}")]
    Config(String),
}

/// Stable classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    CorruptDocument,
    OcrUnavailable,
    OcrServiceError,
    PageExtractionError,
    Cancelled,
    Io,
    Config,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::CorruptDocument(_) => ErrorKind::CorruptDocument,
            Error::OcrUnavailable => ErrorKind::OcrUnavailable,
            Error::OcrService(_) | Error::OcrTimeout(_) | Error::Http(_) => {
                ErrorKind::OcrServiceError
            }
            Error::PageExtraction { .. } | Error::Image(_) => ErrorKind::PageExtractionError,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether this error only costs the current page, never the document.
    pub fn is_page_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OcrUnavailable | ErrorKind::OcrServiceError | ErrorKind::PageExtractionError
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::CorruptDocument(err.to_string()),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_media_type() {
        let err = Error::UnsupportedFormat {
            media_type: "text/plain".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("text/plain"));
        assert!(msg.starts_with("نوع الملف غير مدعوم"));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_page_recoverable_kinds() {
        assert!(Error::OcrUnavailable.is_page_recoverable());
        assert!(Error::OcrService("bad image".into()).is_page_recoverable());
        assert!(Error::OcrTimeout(Duration::from_secs(5)).is_page_recoverable());
        assert!(Error::PageExtraction {
            page: 3,
            reason: "bad stream".into()
        }
        .is_page_recoverable());

        assert!(!Error::CorruptDocument("x".into()).is_page_recoverable());
        assert!(!Error::Cancelled.is_page_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_timeout_message_mentions_seconds() {
        let err = Error::OcrTimeout(Duration::from_secs(5));
        assert!(err.to_string().contains('5'));
    }
}
