//! Extraction options and configuration.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::normalize::NormalizeOptions;

/// Default number of non-whitespace characters at or below which a page is
/// sent to OCR.
pub const DEFAULT_OCR_THRESHOLD: usize = 20;
/// Default upscaling factor used when rasterizing a page for OCR.
pub const DEFAULT_OCR_SCALE: f32 = 3.0;
/// Default per-page OCR budget.
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for extracting text from an upload.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Pages whose reconstructed text has at most this many non-whitespace
    /// characters go through OCR
    pub ocr_threshold: usize,

    /// Rasterization scale factor for OCR input
    pub ocr_scale: f32,

    /// Maximum time spent waiting for OCR on one page
    pub ocr_timeout: Duration,

    /// Page selection (which PDF pages to process)
    pub pages: PageSelection,

    /// Final cleanup pass
    pub normalize: NormalizeOptions,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR trigger threshold.
    pub fn with_ocr_threshold(mut self, threshold: usize) -> Self {
        self.ocr_threshold = threshold;
        self
    }

    /// Set the rasterization scale.
    pub fn with_ocr_scale(mut self, scale: f32) -> Self {
        self.ocr_scale = scale;
        self
    }

    /// Set the per-page OCR timeout.
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set normalization options.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Whether a page's embedded text is too thin to keep.
    pub fn needs_ocr(&self, page_text: &str) -> bool {
        page_text.chars().filter(|c| !c.is_whitespace()).count() <= self.ocr_threshold
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            ocr_threshold: DEFAULT_OCR_THRESHOLD,
            ocr_scale: DEFAULT_OCR_SCALE,
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
            pages: PageSelection::All,
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Page selection for processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Process all pages
    #[default]
    All,
    /// Process a range of pages (1-indexed, inclusive)
    Range(RangeInclusive<u32>),
    /// Process specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                if start == 0 || start > end {
                    return Err(format!("Invalid page range: {}", s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                pages.extend(start..=end);
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                pages.push(p);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        if pages.first() == Some(&0) {
            return Err("Page numbers start at 1".to_string());
        }
        Ok(PageSelection::Pages(pages))
    }
}

/// Cooperative cancellation flag, checked between pages.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_ocr_threshold(50)
            .with_ocr_scale(2.0)
            .with_ocr_timeout(Duration::from_secs(2))
            .with_pages(PageSelection::Range(1..=3));

        assert_eq!(options.ocr_threshold, 50);
        assert_eq!(options.ocr_scale, 2.0);
        assert_eq!(options.ocr_timeout, Duration::from_secs(2));
        assert!(options.pages.includes(3));
        assert!(!options.pages.includes(4));
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.ocr_threshold, 20);
        assert_eq!(options.ocr_scale, 3.0);
        assert_eq!(options.ocr_timeout, Duration::from_secs(5));
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_needs_ocr_counts_non_whitespace() {
        let options = ExtractOptions::default();
        // 20 letters spread over spaces and newlines: still at the threshold.
        assert!(options.needs_ocr("abcde fghij\nklmno\tpqrst   "));
        assert!(!options.needs_ocr("abcdefghijklmnopqrstu"));
        assert!(options.needs_ocr(""));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("2-4").unwrap(),
            PageSelection::Range(2..=4)
        );
        assert_eq!(
            PageSelection::parse("5,1,3-4,3").unwrap(),
            PageSelection::Pages(vec![1, 3, 4, 5])
        );
        assert!(PageSelection::parse("4-2").is_err());
        assert!(PageSelection::parse("0,1").is_err());
        assert!(PageSelection::parse("x").is_err());
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
