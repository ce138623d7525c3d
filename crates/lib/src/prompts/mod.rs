//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the summarization pipeline.

pub mod summary;

pub use summary::{assemble_prompt, get_guidance_instruction};
