//! Positioned text runs and the lines rebuilt from them.

use serde::{Deserialize, Serialize};

/// One fragment of text drawn on a page, at its baseline position.
///
/// Coordinates are in PDF user space: origin at the bottom-left corner,
/// so a larger `y` is higher on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTextRun {
    /// Horizontal baseline offset
    pub x: f32,
    /// Vertical baseline offset
    pub y: f32,
    /// The literal string, whitespace untouched
    pub text: String,
}

impl PageTextRun {
    /// Create a new run.
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Writing direction decided for a whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Runs sharing a baseline, already sorted into reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedLine {
    /// Rounded baseline shared by every run
    pub y: i64,
    /// Direction the runs were ordered by
    pub direction: Direction,
    /// Runs in reading order
    pub runs: Vec<PageTextRun>,
}

impl ReconstructedLine {
    /// Line text: runs joined by a single space.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == Direction::Rtl
    }
}
