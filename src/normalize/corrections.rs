//! Literal find/replace pairs for recurring Arabic glyph-order artifacts.
//!
//! PDF text layers and OCR output regularly swap or split letters in a
//! handful of common words. The table maps each observed artifact to the
//! correct word. It is exact-match and order-independent; new artifacts are
//! added as new pairs, either in code or from a JSON file:
//!
//! ```json
//! [
//!   {"find": "يف", "replace": "في", "whole_word": true},
//!   {"find": "حتليل", "replace": "تحليل"}
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single artifact and its correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Exact text produced by the broken extraction
    pub find: String,
    /// Text to put in its place
    pub replace: String,
    /// Only replace when not glued to other letters
    #[serde(default)]
    pub whole_word: bool,
}

impl Correction {
    /// Substring correction.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            whole_word: false,
        }
    }

    /// Correction applied only to standalone words.
    pub fn whole_word(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            whole_word: true,
            ..Self::new(find, replace)
        }
    }

    fn apply(&self, text: &str) -> String {
        if self.whole_word {
            replace_whole_word(text, &self.find, &self.replace)
        } else {
            text.replace(&self.find, &self.replace)
        }
    }
}

/// Ordered collection of [`Correction`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionTable {
    entries: Vec<Correction>,
}

impl CorrectionTable {
    /// A table with no corrections.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a JSON array of corrections.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a JSON array of corrections from disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Add a correction. A pair with the same `find` text replaces the
    /// existing one.
    pub fn push(&mut self, correction: Correction) {
        match self.entries.iter_mut().find(|c| c.find == correction.find) {
            Some(existing) => *existing = correction,
            None => self.entries.push(correction),
        }
    }

    /// Merge another table into this one.
    pub fn extend(&mut self, other: CorrectionTable) {
        for correction in other.entries {
            self.push(correction);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correction> {
        self.entries.iter()
    }

    /// Reject entries that cannot be applied.
    pub fn validate(&self) -> Result<()> {
        match self.entries.iter().find(|c| c.find.is_empty()) {
            Some(c) => Err(Error::Config(format!(
                "correction with empty search text (replacement {:?})",
                c.replace
            ))),
            None => Ok(()),
        }
    }

    /// Apply every correction once.
    pub fn apply(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, c| c.apply(&acc))
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self {
            entries: vec![
                // Bare substring matching would also hit كيف and سيف.
                Correction::whole_word("يف", "في"),
                Correction::new("حتليل", "تحليل"),
                Correction::new("حيويها", "يحتويها"),
                Correction::new("ا ملعنى", "المعنى"),
                Correction::new("اخرتاع", "اختراع"),
                Correction::new("املعىن", "المعنى"),
                Correction::new("رتكييب", "تركيب"),
                Correction::new("اجلوانب", "الجوانب"),
            ],
        }
    }
}

impl FromIterator<Correction> for CorrectionTable {
    fn from_iter<I: IntoIterator<Item = Correction>>(iter: I) -> Self {
        let mut table = Self::empty();
        for correction in iter {
            table.push(correction);
        }
        table
    }
}

/// Letters, digits and Arabic diacritics all glue to a word.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || ('\u{064B}'..='\u{065F}').contains(&c)
        || c == '\u{0670}'
        || c == '\u{0640}'
}

fn replace_whole_word(text: &str, find: &str, replace: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for (idx, _) in text.match_indices(find) {
        let end = idx + find.len();
        let before = text[..idx].chars().next_back();
        let after = text[end..].chars().next();

        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            out.push_str(&text[last..idx]);
            out.push_str(replace);
            last = end;
        }
    }

    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_fixes_known_artifacts() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("حتليل النص"), "تحليل النص");
        assert_eq!(table.apply("اجلوانب"), "الجوانب");
        assert_eq!(table.apply("ا ملعنى"), "المعنى");
    }

    #[test]
    fn test_whole_word_leaves_longer_words_alone() {
        let table = CorrectionTable::default();
        assert_eq!(table.apply("ذهبت يف المدرسة"), "ذهبت في المدرسة");
        assert_eq!(table.apply("كيف حالك"), "كيف حالك");
        assert_eq!(table.apply("يف."), "في.");
        assert_eq!(table.apply("(يف)"), "(في)");
    }

    #[test]
    fn test_attached_prefix_form_left_unchanged() {
        // وَ/فَ + يف stays as written; only the standalone word is repaired.
        let table = CorrectionTable::default();
        assert_eq!(table.apply("ويف البيت"), "ويف البيت");
        assert_eq!(table.apply("فيف"), "فيف");
        assert_eq!(table.apply("و يف البيت"), "و في البيت");
    }

    #[test]
    fn test_whole_word_respects_diacritics() {
        // A trailing fatha keeps the match glued to the word.
        assert_eq!(replace_whole_word("يفَ", "يف", "في"), "يفَ");
    }

    #[test]
    fn test_push_replaces_same_find() {
        let mut table = CorrectionTable::empty();
        table.push(Correction::new("a", "b"));
        table.push(Correction::new("a", "c"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.apply("a"), "c");
    }

    #[test]
    fn test_from_json_str() {
        let table = CorrectionTable::from_json_str(
            r#"[{"find": "اجلامعة", "replace": "الجامعة"}, {"find": "x", "replace": "y", "whole_word": true}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.iter().next().unwrap().whole_word);
        assert_eq!(table.apply("اجلامعة x xx"), "الجامعة y xx");
    }

    #[test]
    fn test_from_json_rejects_empty_find() {
        let result = CorrectionTable::from_json_str(r#"[{"find": "", "replace": "y"}]"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_file_and_extend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.json");
        std::fs::write(&path, r#"[{"find": "اجلامعة", "replace": "الجامعة"}]"#).unwrap();

        let mut table = CorrectionTable::default();
        let before = table.len();
        table.extend(CorrectionTable::from_json_file(&path).unwrap());
        assert_eq!(table.len(), before + 1);
    }
}
