//! Regrouping of positioned runs into reading-order lines.
//!
//! Runs are bucketed by their rounded baseline. Buckets are emitted from the
//! top of the page down (PDF space grows upwards). The direction of each line
//! is decided once, from the unsorted concatenation of its runs: any code
//! point in the Arabic block makes the line right-to-left. Only then are the
//! runs sorted, by descending `x` for RTL lines and ascending `x` otherwise.
//!
//! Direction is a per-line decision. A single run that mixes scripts is
//! never split, so embedded Latin words inside an Arabic line keep the
//! position of the run that carries them.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{Direction, PageTextRun, ReconstructedLine};

/// Whether a string contains any character from the Arabic block (U+0600–U+06FF).
pub fn is_arabic_script(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Group runs into lines, top of page first.
pub fn reconstruct_lines(runs: Vec<PageTextRun>) -> Vec<ReconstructedLine> {
    let mut buckets: BTreeMap<i64, Vec<PageTextRun>> = BTreeMap::new();
    for run in runs {
        buckets.entry(run.y.round() as i64).or_default().push(run);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(y, mut runs)| {
            let unsorted: String = runs
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let direction = if is_arabic_script(&unsorted) {
                Direction::Rtl
            } else {
                Direction::Ltr
            };

            // Stable sort: runs drawn at the same x keep stream order.
            match direction {
                Direction::Rtl => runs.sort_by(|a, b| cmp_f32(b.x, a.x)),
                Direction::Ltr => runs.sort_by(|a, b| cmp_f32(a.x, b.x)),
            }

            ReconstructedLine { y, direction, runs }
        })
        .collect()
}

/// Join reconstructed lines with newlines.
pub fn lines_to_text(lines: &[ReconstructedLine]) -> String {
    lines
        .iter()
        .map(ReconstructedLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reconstruct a page's text block in one step.
pub fn page_text(runs: Vec<PageTextRun>) -> String {
    lines_to_text(&reconstruct_lines(runs))
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
