//! # Model Response Handling
//!
//! Models frequently wrap JSON in markdown fences even when told not to. The sanitizer
//! strips those markers, and the parser turns what is left into typed summary items.

use crate::{errors::SummaryError, types::SummaryItem};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Strips markdown code-fence markers from raw model output.
///
/// Removal repeats until no marker is left, because deleting one marker can join the
/// backticks on either side into a new one. The result is trimmed on both ends, which
/// makes the transform idempotent.
pub fn sanitize_response(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();
    while cleaned.contains(FENCE) {
        cleaned = cleaned.replace(JSON_FENCE, "").replace(FENCE, "");
    }
    cleaned.trim().to_string()
}

/// Parses sanitized model output as a JSON array of summary items.
///
/// An empty array is a valid result. Unknown fields are ignored; anything that is not
/// an array of objects carrying the four expected fields is a [`SummaryError::SummaryParse`].
pub fn parse_summary_items(json_text: &str) -> Result<Vec<SummaryItem>, SummaryError> {
    Ok(serde_json::from_str::<Vec<SummaryItem>>(json_text)?)
}
