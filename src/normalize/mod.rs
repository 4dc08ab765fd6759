//! Final cleanup of extracted Arabic text.
//!
//! One normalization pass does, in order:
//! 1. optional Unicode NFC
//! 2. non-breaking spaces become plain spaces
//! 3. runs of spaces and tabs collapse to one space
//! 4. three or more newlines collapse to a blank line
//! 5. leading and trailing whitespace is trimmed
//! 6. the [`CorrectionTable`] is applied
//!
//! [`ArabicNormalizer::normalize`] repeats the pass until the text stops
//! changing, so normalizing twice never changes the result.

mod corrections;

pub use corrections::{Correction, CorrectionTable};

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

/// Upper bound on repeated passes. A table whose replacements feed each
/// other in a cycle stops here instead of looping forever.
const MAX_PASSES: usize = 8;

/// Options for text normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Glyph-order corrections applied after whitespace cleanup
    pub corrections: CorrectionTable,

    /// Compose to Unicode NFC before anything else
    pub unicode_nfc: bool,
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the correction table.
    pub fn with_corrections(mut self, corrections: CorrectionTable) -> Self {
        self.corrections = corrections;
        self
    }

    /// Enable or disable NFC composition.
    pub fn with_unicode_nfc(mut self, enabled: bool) -> Self {
        self.unicode_nfc = enabled;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            corrections: CorrectionTable::default(),
            unicode_nfc: false,
        }
    }
}

/// Compiled normalizer.
#[derive(Debug, Clone)]
pub struct ArabicNormalizer {
    options: NormalizeOptions,
    horizontal_ws: Regex,
    excess_newlines: Regex,
}

impl ArabicNormalizer {
    /// Build a normalizer, validating the correction table.
    pub fn new(options: NormalizeOptions) -> Result<Self> {
        options.corrections.validate()?;

        Ok(Self {
            options,
            horizontal_ws: Regex::new(r"[ \t]+")?,
            excess_newlines: Regex::new(r"\n{3,}")?,
        })
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize text to a fixed point.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);

        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }

        log::debug!("normalization did not settle after {} passes", MAX_PASSES);
        current
    }

    fn pass(&self, text: &str) -> String {
        let text = if self.options.unicode_nfc {
            text.nfc().collect::<String>()
        } else {
            text.to_string()
        };

        let text = text.replace('\u{00A0}', " ");
        let text = self.horizontal_ws.replace_all(&text, " ");
        let text = self.excess_newlines.replace_all(&text, "\n\n");

        self.options.corrections.apply(text.trim())
    }
}

/// Normalize with the default options.
pub fn normalize_text(text: &str) -> Result<String> {
    Ok(ArabicNormalizer::new(NormalizeOptions::default())?.normalize(text))
}
