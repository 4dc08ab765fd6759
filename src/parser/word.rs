//! Raw text extraction from Word documents.

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::error::{Error, Result};

/// Paragraph-level text extractor for Word uploads.
///
/// Only body paragraphs contribute, as plain run text. Tables, images,
/// headers and styling are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract paragraph text, paragraphs separated by a blank line.
    ///
    /// Legacy binary `.doc` files are not readable and fail with
    /// [`Error::CorruptDocument`], like any other unparseable upload.
    pub fn extract(&self, data: &[u8]) -> Result<String> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| Error::CorruptDocument(format!("{:?}", e)))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
            .collect();

        log::debug!("word document: {} non-empty paragraphs", paragraphs.len());
        Ok(paragraphs.join("\n\n"))
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut buf = String::new();
    push_children(&mut buf, &paragraph.children);
    buf
}

fn push_children(buf: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => buf.push_str(&t.text),
                        RunChild::Tab(_) => buf.push('\t'),
                        RunChild::Break(_) => buf.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(buf, &link.children),
            _ => {}
        }
    }
}
