//! Positioned text run extraction from page content streams.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::PageTextRun;

use super::backend::{ContentOp, FontMetrics, PageId, PdfBackend, PdfValue, FALLBACK_GLYPH_WIDTH};

/// TJ adjustments larger than this (in 1/1000 text space units) are
/// treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Font size assumed until the first `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Extract every positioned text run on a page.
///
/// Whitespace inside a run is preserved; runs that are entirely
/// whitespace are dropped. Fails with [`Error::PageExtraction`] when the
/// content stream cannot be read or decoded.
pub fn extract_page_runs<B: PdfBackend + ?Sized>(
    backend: &B,
    page_num: u32,
    page_id: PageId,
) -> Result<Vec<PageTextRun>> {
    let page_error = |e: Error| Error::PageExtraction {
        page: page_num,
        reason: e.to_string(),
    };

    let content = backend.page_content(page_id).map_err(page_error)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let ops = backend.decode_content(&content).map_err(page_error)?;
    Ok(collect_runs(
        &ops,
        |font, bytes| backend.decode_text(page_id, font, bytes),
        |font| backend.font_metrics(page_id, font),
    ))
}

/// Walk decoded operations and emit runs positioned in page space.
///
/// `decode` turns a string operand into text for the currently selected
/// font; `metrics` supplies that font's glyph widths so the pen advances
/// past each shown string. Positions combine the text matrix with the
/// current transformation matrix, so `cm`, `q` and `Q` are honoured.
pub fn collect_runs<F, M>(ops: &[ContentOp], decode: F, metrics: M) -> Vec<PageTextRun>
where
    F: Fn(&[u8], &[u8]) -> String,
    M: Fn(&[u8]) -> Option<FontMetrics>,
{
    let mut runs = Vec::new();
    let mut font_cache: HashMap<Vec<u8>, Option<FontMetrics>> = HashMap::new();
    let mut stack: Vec<GraphicsState> = Vec::new();
    let mut gs = GraphicsState::default();
    let mut text = TextObject::default();
    let mut in_text_block = false;

    for op in ops {
        match op.operator.as_str() {
            "q" => stack.push(gs.clone()),
            "Q" => {
                if let Some(saved) = stack.pop() {
                    gs = saved;
                }
            }
            "cm" if op.operands.len() >= 6 => {
                gs.ctm = Matrix::from_operands(op).multiply(&gs.ctm);
            }
            "BT" => {
                in_text_block = true;
                text = TextObject::default();
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    gs.font_name = name.clone();
                    font_cache
                        .entry(name.clone())
                        .or_insert_with(|| metrics(name.as_slice()));
                }
                gs.font_size = op.number(1, gs.font_size);
            }
            "Tc" => gs.char_spacing = op.number(0, gs.char_spacing),
            "Tw" => gs.word_spacing = op.number(0, gs.word_spacing),
            "Tz" => gs.horizontal_scaling = op.number(0, 100.0) / 100.0,
            "TL" => gs.leading = op.number(0, gs.leading),
            "Ts" => gs.rise = op.number(0, gs.rise),
            "Td" => text.move_line(op.number(0, 0.0), op.number(1, 0.0)),
            "TD" => {
                let ty = op.number(1, 0.0);
                gs.leading = -ty;
                text.move_line(op.number(0, 0.0), ty);
            }
            "Tm" if op.operands.len() >= 6 => text.set(Matrix::from_operands(op)),
            "T*" => text.move_line(0.0, -gs.leading),
            "Tj" if in_text_block => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let font = font_cache.get(&gs.font_name).and_then(Option::as_ref);
                    show_string(&mut runs, &mut text, &gs, font, bytes, &decode);
                }
            }
            "TJ" if in_text_block => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let font = font_cache.get(&gs.font_name).and_then(Option::as_ref);
                    show_array(&mut runs, &mut text, &gs, font, items, &decode);
                }
            }
            "'" | "\"" => {
                if op.operator == "\"" {
                    gs.word_spacing = op.number(0, gs.word_spacing);
                    gs.char_spacing = op.number(1, gs.char_spacing);
                }
                text.move_line(0.0, -gs.leading);
                if in_text_block {
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(idx) {
                        let font = font_cache.get(&gs.font_name).and_then(Option::as_ref);
                        show_string(&mut runs, &mut text, &gs, font, bytes, &decode);
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

fn push_run(runs: &mut Vec<PageTextRun>, text: &TextObject, gs: &GraphicsState, s: String) {
    if !s.trim().is_empty() {
        let (x, y) = text.origin(gs);
        runs.push(PageTextRun::new(x, y, s));
    }
}

fn show_string<F>(
    runs: &mut Vec<PageTextRun>,
    text: &mut TextObject,
    gs: &GraphicsState,
    font: Option<&FontMetrics>,
    bytes: &[u8],
    decode: &F,
) where
    F: Fn(&[u8], &[u8]) -> String,
{
    let decoded = decode(gs.font_name.as_slice(), bytes);
    let advance = string_advance(gs, font, bytes, &decoded);
    push_run(runs, text, gs, decoded);
    text.advance(advance);
}

/// A TJ array becomes one run: strings are joined, inserting a space at
/// large kerning gaps, and every element moves the pen.
fn show_array<F>(
    runs: &mut Vec<PageTextRun>,
    text: &mut TextObject,
    gs: &GraphicsState,
    font: Option<&FontMetrics>,
    items: &[PdfValue],
    decode: &F,
) where
    F: Fn(&[u8], &[u8]) -> String,
{
    let start = text.clone();
    let mut combined = String::new();

    for item in items {
        match item {
            PdfValue::Str(bytes) => {
                let decoded = decode(gs.font_name.as_slice(), bytes);
                text.advance(string_advance(gs, font, bytes, &decoded));
                combined.push_str(&decoded);
            }
            PdfValue::Integer(_) | PdfValue::Real(_) => {
                // Negative adjustments move the pen forward.
                let adjustment = -item.as_number().unwrap_or(0.0);
                text.advance(adjustment / 1000.0 * gs.font_size * gs.horizontal_scaling);
                if adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(char::is_whitespace)
                {
                    combined.push(' ');
                }
            }
            _ => {}
        }
    }

    push_run(runs, &start, gs, combined);
}

/// Horizontal displacement of a shown string in unscaled text space.
///
/// Without font widths every decoded character is assumed to be
/// [`FALLBACK_GLYPH_WIDTH`] wide.
fn string_advance(
    gs: &GraphicsState,
    font: Option<&FontMetrics>,
    bytes: &[u8],
    decoded: &str,
) -> f32 {
    let glyph = |width: f32, is_space: bool| {
        let mut tx = width / 1000.0 * gs.font_size + gs.char_spacing;
        if is_space {
            tx += gs.word_spacing;
        }
        tx * gs.horizontal_scaling
    };

    match font {
        Some(metrics) => metrics
            .codes(bytes)
            .into_iter()
            .map(|code| glyph(metrics.width(code), !metrics.two_byte && code == 32))
            .sum(),
        None => decoded
            .chars()
            .map(|c| glyph(FALLBACK_GLYPH_WIDTH, c == ' '))
            .sum(),
    }
}

/// Graphics state entries that affect text placement; saved by `q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_name: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_name: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Text matrix and text line matrix of the current `BT` block.
#[derive(Debug, Clone)]
struct TextObject {
    matrix: Matrix,
    line: Matrix,
}

impl Default for TextObject {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line: Matrix::IDENTITY,
        }
    }
}

impl TextObject {
    fn set(&mut self, m: Matrix) {
        self.matrix = m;
        self.line = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.set(Matrix::translation(tx, ty).multiply(&self.line));
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).multiply(&self.matrix);
    }

    /// Baseline origin in page space.
    fn origin(&self, gs: &GraphicsState) -> (f32, f32) {
        self.matrix.multiply(&gs.ctm).apply(0.0, gs.rise)
    }
}

/// PDF affine matrix `[a b c d e f]`, row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(op: &ContentOp) -> Self {
        Self {
            a: op.number(0, 1.0),
            b: op.number(1, 0.0),
            c: op.number(2, 0.0),
            d: op.number(3, 1.0),
            e: op.number(4, 0.0),
            f: op.number(5, 0.0),
        }
    }

    /// `self × other`: apply `self` first, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}
