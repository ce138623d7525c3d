//! # anycite-pdf: PDF Text Extraction
//!
//! This crate provides the PDF implementation of the `TextExtractor` trait from the core
//! `anycite` library. Text is collected per page so every page keeps its physical page
//! number, which is what summary citations point at.

use anycite::{ExtractedText, SummaryError, TextExtractor};
use async_trait::async_trait;
use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use tracing::{info, instrument, warn};

/// Extracts page-tagged text from PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// `TJ` offsets below this many thousandths of an em are read as a space between words.
const WORD_GAP: f32 = -200.0;

/// Extracts the text of every page synchronously, in page order.
///
/// Pages without a content stream are kept as empty strings so later page numbers stay
/// aligned with the physical document.
pub fn extract_pages(pdf_data: &[u8]) -> Result<Vec<String>, pdf::error::PdfError> {
    let file = FileOptions::cached().load(pdf_data)?;
    let resolver = file.resolver();
    let mut pages = Vec::with_capacity(file.num_pages() as usize);

    for page_num in 0..file.num_pages() {
        let page = file.get_page(page_num)?;
        let mut page_text = String::new();

        match &page.contents {
            Some(content) => {
                for op in content.operations(&resolver)?.iter() {
                    match op {
                        Op::TextDraw { text } => page_text.push_str(&text.to_string_lossy()),
                        Op::TextDrawAdjusted { array } => {
                            for item in array.iter() {
                                match item {
                                    TextDrawAdjusted::Text(text) => {
                                        page_text.push_str(&text.to_string_lossy())
                                    }
                                    // Offsets are in thousandths of an em; wide negative ones are word gaps.
                                    TextDrawAdjusted::Spacing(offset) if *offset < WORD_GAP => {
                                        push_separator(&mut page_text, ' ')
                                    }
                                    TextDrawAdjusted::Spacing(_) => {}
                                }
                            }
                        }
                        Op::MoveTextPosition { translation } if translation.y != 0.0 => {
                            push_separator(&mut page_text, '\n')
                        }
                        Op::MoveTextPosition { .. } | Op::SetTextMatrix { .. } => {
                            push_separator(&mut page_text, ' ')
                        }
                        Op::TextNewline | Op::EndText => push_separator(&mut page_text, '\n'),
                        _ => {}
                    }
                }
            }
            None => warn!("Page {} has no content stream.", page_num + 1),
        }

        pages.push(page_text.trim_end().to_string());
    }

    Ok(pages)
}

/// Appends `separator` unless the text is empty or already ends in whitespace.
fn push_separator(text: &mut String, separator: char) {
    if text.ends_with(char::is_whitespace) {
        if separator == '\n' && text.ends_with(' ') {
            text.pop();
            text.push('\n');
        }
        return;
    }
    if !text.is_empty() {
        text.push(separator);
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    #[instrument(skip(self, bytes), fields(byte_len = bytes.len()))]
    async fn extract(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ExtractedText, SummaryError> {
        // PDF parsing is CPU-bound, so it runs on the blocking pool. A parser panic
        // surfaces as a join error and is reported as an unreadable document.
        let pages =
            tokio::task::spawn_blocking(move || extract_pages(&bytes).map_err(|e| e.to_string()))
                .await
                .map_err(|e| SummaryError::extraction(file_name, format!("PDF parser aborted: {e}")))?
                .map_err(|e| SummaryError::extraction(file_name, e))?;

        info!("Extracted {} page(s) from '{}'.", pages.len(), file_name);
        Ok(ExtractedText::new(pages))
    }
}
