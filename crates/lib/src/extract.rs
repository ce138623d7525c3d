//! # Text Extraction Contract
//!
//! Format-specific crates (e.g. `anycite-pdf`) implement [`TextExtractor`] so the core
//! pipeline can treat every document source the same way.

use crate::errors::SummaryError;
use async_trait::async_trait;
use std::fmt::Write as _;

/// The plain text of one document, one entry per physical page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pages: Vec<String>,
}

impl ExtractedText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the text of a 1-based page number.
    pub fn page(&self, page_number: i64) -> Option<&str> {
        let index = usize::try_from(page_number).ok()?.checked_sub(1)?;
        self.pages.get(index).map(String::as_str)
    }

    /// Renders the pages as `--- Page N ---` delimited text, pages in order.
    pub fn to_tagged_text(&self) -> String {
        let mut tagged = String::new();
        for (index, text) in self.pages.iter().enumerate() {
            let _ = writeln!(tagged, "--- Page {} ---", index + 1);
            tagged.push_str(text);
            tagged.push('\n');
        }
        tagged
    }
}

/// Turns a raw document byte stream into page-separated plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts the text of every page, in page order.
    ///
    /// Implementations must fail with [`SummaryError::Extraction`] when the bytes are not
    /// a readable document.
    async fn extract(&self, bytes: Vec<u8>, file_name: &str)
        -> Result<ExtractedText, SummaryError>;

    /// Extracts the document and renders it with page markers.
    async fn extract_text(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, SummaryError> {
        Ok(self.extract(bytes, file_name).await?.to_tagged_text())
    }
}
