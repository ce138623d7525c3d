//! # Citation Summary Prompts
//!
//! Templates that instruct a model to summarize several documents into a JSON array of
//! citation items, plus the assembler that stitches them together with the document
//! blocks. Assembly is deterministic: the same blocks and instruction always produce the
//! same prompt bytes.

use crate::document::DocumentBlock;

/// The fixed task preamble placed at the top of every summarization prompt.
pub const SUMMARY_TASK_PREAMBLE: &str = r#"You are an expert study assistant. You will receive one or more documents, each wrapped between "=== DOC START ===" and "=== DOC END ===" and identified by a numeric "docsId". Page boundaries inside each document are marked with "--- Page N ---".

Summarize the documents and return the result as a JSON array. Every element of the array MUST be an object with exactly these four fields:
- "summarySentence": a single sentence summarizing one point.
- "originalQuote": the passage from the document that supports the sentence.
- "docsId": the numeric docsId of the document the quote comes from.
- "pageNumber": the page number (from the nearest preceding "--- Page N ---" marker) on which the quote appears.

# Rules
1. Output MUST be valid JSON and nothing else. Do not wrap it in markdown code fences.
2. "originalQuote" MUST be copied verbatim from the document, including whitespace and punctuation. Do not paraphrase, correct or translate it.
3. Each "summarySentence" MUST be exactly one sentence.
4. Do not repeat the same content in more than one item.
5. Cover every document you are given."#;

/// The heading placed above user-supplied guidance.
pub const ADDITIONAL_GUIDANCE_HEADING: &str = "# Additional Guidance";

/// The heading placed above the concatenated document blocks.
pub const DOCUMENTS_HEADING: &str = "# Documents";

/// The system message sent to chat-style providers alongside the assembled prompt.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a summarization engine. Respond with a raw JSON array only. Never use markdown formatting or code fences, and never add explanations before or after the array.";

/// Generates the guidance section for a user instruction.
///
/// Returns `None` when the instruction is absent or only whitespace, so no empty heading
/// ends up in the prompt.
pub fn get_guidance_instruction(instruction: Option<&str>) -> Option<String> {
    match instruction.map(str::trim) {
        Some(inst) if !inst.is_empty() => Some(format!(
            "{ADDITIONAL_GUIDANCE_HEADING}\nFollow this guidance from the user while still obeying every rule above:\n{inst}"
        )),
        _ => None,
    }
}

/// Builds the full summarization prompt from document blocks in input order.
pub fn assemble_prompt(blocks: &[DocumentBlock], instruction: Option<&str>) -> String {
    let documents = blocks
        .iter()
        .map(DocumentBlock::render)
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::from(SUMMARY_TASK_PREAMBLE);
    if let Some(guidance) = get_guidance_instruction(instruction) {
        prompt.push_str("\n\n");
        prompt.push_str(&guidance);
    }
    prompt.push_str("\n\n");
    prompt.push_str(DOCUMENTS_HEADING);
    prompt.push('\n');
    prompt.push_str(&documents);
    prompt
}
