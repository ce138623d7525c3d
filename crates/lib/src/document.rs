//! # Document Blocks
//!
//! Each source document enters the prompt as one delimited block carrying its ID, its
//! display name and its page-tagged text. Blocks are clipped per document so the total
//! prompt size stays bounded.

/// Marker appended to text cut by [`clip`].
pub const TRUNCATION_MARKER: &str = "... [TRUNCATED]";

/// One document's prepared contribution to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub docs_id: i64,
    pub file_name: String,
    pub content: String,
}

impl DocumentBlock {
    /// Renders the block in the delimited form the prompt preamble describes.
    pub fn render(&self) -> String {
        format!(
            "=== DOC START ===\ndocsId: {}\nfileName: {}\ncontent:\n{}\n=== DOC END ===",
            self.docs_id, self.file_name, self.content
        )
    }
}

/// The trimmed file name, or `document-<id>` when the name is absent or blank.
pub fn display_name(docs_id: i64, file_name: Option<&str>) -> String {
    match file_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("document-{docs_id}"),
    }
}

/// Builds a block, falling back to `document-<id>` when no usable name is given.
pub fn format_block(docs_id: i64, file_name: Option<&str>, tagged_text: &str) -> DocumentBlock {
    DocumentBlock {
        docs_id,
        file_name: display_name(docs_id, file_name),
        content: tagged_text.to_string(),
    }
}

/// Truncates `text` to `max_chars` characters and appends [`TRUNCATION_MARKER`].
///
/// Text at or under the limit is returned unchanged. Lengths are counted in `char`s so
/// multi-byte text is never split inside a code point.
pub fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut clipped = String::with_capacity(cut + TRUNCATION_MARKER.len());
            clipped.push_str(&text[..cut]);
            clipped.push_str(TRUNCATION_MARKER);
            clipped
        }
        None => text.to_string(),
    }
}
