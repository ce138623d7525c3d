//! # Summary Pipeline
//!
//! Orchestrates one summarization request end to end:
//!
//! 1.  **Validation**: the request must name at least one document, document IDs must be
//!     unique, and the model key must resolve to a catalog entry with a configured client.
//! 2.  **Extraction**: every document is read and extracted concurrently. Blocks are then
//!     clipped and formatted in the original input order.
//! 3.  **Provider call**: the assembled prompt goes to the routed client exactly once,
//!     bounded by the configured timeout.
//! 4.  **Sanitizing & parsing**: fence markers are stripped and the reply is parsed into
//!     typed items.
//! 5.  **Citation checks**: items citing unknown documents or impossible pages are dropped
//!     (and, when enabled, items whose quote does not appear on the cited page).
//!
//! Any fatal error aborts the run; nothing reaches the sink unless the whole run succeeded.

use crate::{
    catalog::ModelOption,
    config::PipelineConfig,
    document::{clip, format_block},
    errors::{ProviderError, SummaryError},
    extract::{ExtractedText, TextExtractor},
    prompts::assemble_prompt,
    providers::ProviderRouter,
    response::{parse_summary_items, sanitize_response},
    sink::SummarySink,
    types::{DocumentRef, Summary, SummaryItem, SummaryRequest},
};
use chrono::Utc;
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// The stages a request moves through. `Failed` is reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Extracting,
    Assembling,
    CallingProvider,
    Sanitizing,
    Parsing,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "RECEIVED",
            PipelineStage::Extracting => "EXTRACTING",
            PipelineStage::Assembling => "ASSEMBLING",
            PipelineStage::CallingProvider => "CALLING_PROVIDER",
            PipelineStage::Sanitizing => "SANITIZING",
            PipelineStage::Parsing => "PARSING",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// A summary that has been handed to a sink, with the identifier the sink assigned.
#[derive(Debug, Clone)]
pub struct StoredSummary {
    pub id: String,
    pub summary: Summary,
}

/// The document-to-citation summarization pipeline.
#[derive(Clone)]
pub struct SummaryPipeline {
    extractor: Arc<dyn TextExtractor>,
    router: ProviderRouter,
    config: PipelineConfig,
}

impl fmt::Debug for SummaryPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryPipeline")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SummaryPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        router: ProviderRouter,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            router,
            config,
        }
    }

    /// Runs the pipeline and returns the finished summary without persisting it.
    #[instrument(
        skip_all,
        fields(
            title = %request.title,
            model_key = %request.model_key,
            documents = request.documents.len(),
            requester = request.requester.as_deref().unwrap_or("anonymous"),
        )
    )]
    pub async fn run(&self, request: SummaryRequest) -> Result<Summary, SummaryError> {
        let mut stage = PipelineStage::Received;
        info!(stage = %stage, "Summary request received.");

        let result = self.execute(request, &mut stage).await;
        match &result {
            Ok(summary) => info!(
                stage = %PipelineStage::Done,
                items = summary.items.len(),
                "Summary pipeline finished."
            ),
            Err(e) => error!(
                stage = %PipelineStage::Failed,
                failed_at = %stage,
                "Summary pipeline failed: {e}"
            ),
        }
        result
    }

    /// Runs the pipeline and hands the result to `sink`. Nothing is saved on failure.
    pub async fn run_and_persist(
        &self,
        request: SummaryRequest,
        sink: &dyn SummarySink,
    ) -> Result<StoredSummary, SummaryError> {
        let summary = self.run(request).await?;
        let id = sink.save(&summary).await?;
        info!(summary_id = %id, "Summary persisted.");
        Ok(StoredSummary { id, summary })
    }

    async fn execute(
        &self,
        request: SummaryRequest,
        stage: &mut PipelineStage,
    ) -> Result<Summary, SummaryError> {
        validate_request(&request)?;
        let model = ModelOption::resolve(&request.model_key)?;
        let client = self.router.route(model.provider())?;

        advance(stage, PipelineStage::Extracting);
        let extracted = try_join_all(
            request
                .documents
                .iter()
                .map(|document| self.extract_document(document)),
        )
        .await?;

        advance(stage, PipelineStage::Assembling);
        let blocks = request
            .documents
            .iter()
            .zip(&extracted)
            .map(|(document, text)| {
                let clipped = clip(&text.to_tagged_text(), self.config.max_chars_per_document);
                format_block(document.document_id, document.file_name.as_deref(), &clipped)
            })
            .collect::<Vec<_>>();
        let prompt = assemble_prompt(&blocks, request.instruction.as_deref());
        debug!(prompt_chars = prompt.chars().count(), "Prompt assembled.");

        advance(stage, PipelineStage::CallingProvider);
        let raw = tokio::time::timeout(
            self.config.request_timeout,
            client.generate(&prompt, model.model_id()),
        )
        .await
        .map_err(|_| ProviderError::Timeout)??;

        advance(stage, PipelineStage::Sanitizing);
        let cleaned = sanitize_response(&raw);

        advance(stage, PipelineStage::Parsing);
        let items = parse_summary_items(&cleaned)?;
        let items = self.retain_valid_citations(items, &request.documents, &extracted);

        Ok(Summary {
            title: request.title,
            description: request.description,
            model_key: model,
            items,
            document_ids: request.documents.iter().map(|d| d.document_id).collect(),
            created_at: Utc::now(),
        })
    }

    async fn extract_document(&self, document: &DocumentRef) -> Result<ExtractedText, SummaryError> {
        let name = document.display_name();
        let bytes = document
            .content
            .read()
            .await
            .map_err(|e| SummaryError::extraction(name.as_str(), e))?;
        let extracted = self.extractor.extract(bytes, &name).await?;
        debug!(
            docs_id = document.document_id,
            pages = extracted.page_count(),
            "Extracted '{name}'."
        );
        Ok(extracted)
    }

    /// Drops items whose citation cannot be traced back to the request's documents.
    fn retain_valid_citations(
        &self,
        items: Vec<SummaryItem>,
        documents: &[DocumentRef],
        extracted: &[ExtractedText],
    ) -> Vec<SummaryItem> {
        let texts: HashMap<i64, &ExtractedText> = documents
            .iter()
            .map(|d| d.document_id)
            .zip(extracted)
            .collect();

        let parsed = items.len();
        let kept = items
            .into_iter()
            .filter(|item| {
                let Some(text) = texts.get(&item.docs_id) else {
                    warn!(docs_id = item.docs_id, "Dropping item citing a document outside the request.");
                    return false;
                };
                let Some(page) = text.page(item.page_number) else {
                    warn!(
                        docs_id = item.docs_id,
                        page_number = item.page_number,
                        page_count = text.page_count(),
                        "Dropping item citing a page the document does not have."
                    );
                    return false;
                };
                if self.config.verify_quotes && !quote_appears_on_page(&item.original_quote, page) {
                    warn!(
                        docs_id = item.docs_id,
                        page_number = item.page_number,
                        "Dropping item whose quote is not found on the cited page."
                    );
                    return false;
                }
                true
            })
            .collect::<Vec<_>>();

        if kept.len() < parsed {
            info!(parsed, kept = kept.len(), "Citation checks removed items.");
        }
        kept
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    info!(from = %stage, to = %next, "Pipeline stage transition.");
    *stage = next;
}

fn validate_request(request: &SummaryRequest) -> Result<(), SummaryError> {
    if request.documents.is_empty() {
        return Err(SummaryError::InvalidRequest(
            "at least one document is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for document in &request.documents {
        if !seen.insert(document.document_id) {
            return Err(SummaryError::InvalidRequest(format!(
                "document {} is listed more than once",
                document.document_id
            )));
        }
    }
    Ok(())
}

fn quote_appears_on_page(quote: &str, page: &str) -> bool {
    let quote = quote.trim();
    !quote.is_empty() && page.contains(quote)
}
