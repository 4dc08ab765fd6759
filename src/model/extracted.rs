//! Extraction output and per-page accounting.

use serde::{Deserialize, Serialize};

use crate::detect::DocumentFormat;
use crate::error::Error;

/// Why a page contributed no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The text layer was too thin and no OCR engine is configured.
    OcrUnavailable,
    /// The OCR service reported an error.
    OcrFailed(String),
    /// The OCR service did not answer in time.
    OcrTimedOut,
    /// The page could not be rendered to an image.
    RenderFailed(String),
    /// The page content stream is malformed.
    PageError(String),
    /// OCR ran but recognised nothing.
    Empty,
}

impl SkipReason {
    /// Reason for a page whose OCR request failed with `err`.
    pub fn from_ocr_error(err: &Error) -> Self {
        match err {
            Error::OcrUnavailable => SkipReason::OcrUnavailable,
            Error::OcrTimeout(_) => SkipReason::OcrTimedOut,
            other => SkipReason::OcrFailed(other.to_string()),
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::OcrUnavailable => write!(f, "OCR not configured"),
            SkipReason::OcrFailed(msg) => write!(f, "OCR failed: {}", msg),
            SkipReason::OcrTimedOut => write!(f, "OCR timed out"),
            SkipReason::RenderFailed(msg) => write!(f, "render failed: {}", msg),
            SkipReason::PageError(msg) => write!(f, "malformed page: {}", msg),
            SkipReason::Empty => write!(f, "no text recognised"),
        }
    }
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Text came from the embedded text layer.
    Embedded { chars: usize },
    /// Text came from OCR.
    Ocr { chars: usize },
    /// Nothing was appended for this page.
    Skipped(SkipReason),
}

impl PageOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, PageOutcome::Skipped(_))
    }
}

/// Per-document account of where the text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Extraction path taken
    pub format: DocumentFormat,

    /// Total pages in the document (0 for Word uploads)
    pub page_count: u32,

    /// Outcome of every processed page, in page order
    pub pages: Vec<(u32, PageOutcome)>,
}

impl ExtractionReport {
    /// Create an empty report.
    pub fn new(format: DocumentFormat, page_count: u32) -> Self {
        Self {
            format,
            page_count,
            pages: Vec::new(),
        }
    }

    /// Record a page outcome.
    pub fn record(&mut self, page: u32, outcome: PageOutcome) {
        self.pages.push((page, outcome));
    }

    /// Page numbers that contributed no text.
    pub fn skipped_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|(_, o)| o.is_skipped())
            .map(|(n, _)| *n)
            .collect()
    }

    /// Page numbers whose text came from OCR.
    pub fn ocr_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|(_, o)| matches!(o, PageOutcome::Ocr { .. }))
            .map(|(n, _)| *n)
            .collect()
    }

    /// Whether some page was lost.
    pub fn is_partial(&self) -> bool {
        self.pages.iter().any(|(_, o)| o.is_skipped())
    }
}

/// Final, normalized text of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Normalized text
    pub text: String,

    /// Where it came from
    pub report: ExtractionReport,
}

impl ExtractedText {
    /// Create a new result.
    pub fn new(text: String, report: ExtractionReport) -> Self {
        Self { text, report }
    }

    /// Number of characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters, cut on a character boundary.
    ///
    /// Scoring consumers only look at a bounded prefix of the document.
    pub fn scoring_prefix(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// Consume the result and keep only the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
