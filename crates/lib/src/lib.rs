//! # anycite
//!
//! A document-to-citation summarization pipeline. PDF documents are extracted with page
//! provenance, wrapped into a size-bounded prompt, sent to one of several interchangeable
//! LLM providers, and the free-text reply is turned into typed summary items that cite a
//! source document and page.
//!
//! The pieces are usable on their own (catalog lookup, prompt assembly, sanitizing and
//! parsing), and [`SummaryPipeline`] wires them together.

pub mod catalog;
pub mod config;
pub mod document;
pub mod errors;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod response;
pub mod sink;
pub mod types;

pub use catalog::{ModelOption, Provider, ProviderEndpoints};
pub use config::{PipelineConfig, ProviderSettings};
pub use errors::{ProviderError, SummaryError};
pub use extract::{ExtractedText, TextExtractor};
pub use pipeline::{PipelineStage, StoredSummary, SummaryPipeline};
pub use providers::{ai::AiProvider, ProviderRouter};
pub use sink::SummarySink;
pub use types::{
    ContentSource, DocumentRef, FileContent, InMemoryContent, Summary, SummaryItem,
    SummaryRequest,
};
