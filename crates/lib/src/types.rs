use crate::{catalog::ModelOption, document};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Gives the pipeline access to the stored bytes of one document.
#[async_trait]
pub trait ContentSource: Send + Sync + fmt::Debug {
    async fn read(&self) -> std::io::Result<Vec<u8>>;
}

/// Document bytes already held in memory.
#[derive(Clone)]
pub struct InMemoryContent(Arc<Vec<u8>>);

impl InMemoryContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }
}

impl fmt::Debug for InMemoryContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InMemoryContent")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn read(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.0.as_ref().clone())
    }
}

/// A document stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileContent {
    async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// A reference to one stored document taking part in a summary request.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub document_id: i64,
    pub file_name: Option<String>,
    pub content: Arc<dyn ContentSource>,
}

impl DocumentRef {
    pub fn new(
        document_id: i64,
        file_name: Option<String>,
        content: impl ContentSource + 'static,
    ) -> Self {
        Self {
            document_id,
            file_name,
            content: Arc::new(content),
        }
    }

    /// The name used in logs and prompt blocks when the caller supplied none.
    pub fn display_name(&self) -> String {
        document::display_name(self.document_id, self.file_name.as_deref())
    }
}

/// The input to one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Opaque identity of the requesting user, used only for logging.
    pub requester: Option<String>,
    pub documents: Vec<DocumentRef>,
    pub title: String,
    pub description: String,
    pub model_key: String,
    pub instruction: Option<String>,
}

/// One citation unit produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub summary_sentence: String,
    pub original_quote: String,
    pub docs_id: i64,
    pub page_number: i64,
}

/// The finished, citation-bearing summary handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub title: String,
    pub description: String,
    pub model_key: ModelOption,
    pub items: Vec<SummaryItem>,
    pub document_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}
