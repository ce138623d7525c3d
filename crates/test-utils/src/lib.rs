use anycite::{
    AiProvider, ExtractedText, ProviderError, Summary, SummaryError, SummarySink, TextExtractor,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Test Setup ---

/// Installs a compact tracing subscriber once per test binary, honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}

// --- Mock AI Provider ---

/// One programmed reply of the [`MockAiProvider`].
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    Error { status: u16, body: String },
    /// Waits for the given duration and then answers with the text.
    Delayed(Duration, String),
}

#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    completed: Arc<AtomicUsize>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that answers every call with `response`, in order, once each.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for response in responses {
            provider.push_reply(MockReply::Text(response.into()));
        }
        provider
    }

    /// Queues a reply for the next unanswered call.
    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Retrieves the recorded `(prompt, model_id)` calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// How many calls ran to the end. A call whose future was dropped is not counted.
    pub fn completed_calls(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), model_id.to_string()));

        let reply = self.replies.lock().unwrap().pop_front();
        let result = match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error { status, body }) => Err(ProviderError::Api { status, body }),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(ProviderError::Api {
                status: 500,
                body: "MockAiProvider: no reply programmed for this call".to_string(),
            }),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

// --- Mock Text Extractor ---

/// An extractor that returns pre-registered pages keyed by file name.
///
/// Bytes equal to [`MockExtractor::CORRUPT`] fail extraction, mimicking an unreadable file.
#[derive(Clone, Debug, Default)]
pub struct MockExtractor {
    documents: Arc<Mutex<HashMap<String, Vec<String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    pub const CORRUPT: &'static [u8] = b"not a document";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document<I, S>(&self, file_name: &str, pages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents.lock().unwrap().insert(
            file_name.to_string(),
            pages.into_iter().map(Into::into).collect(),
        );
    }

    /// The file names extraction was requested for, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ExtractedText, SummaryError> {
        self.calls.lock().unwrap().push(file_name.to_string());
        if bytes == Self::CORRUPT {
            return Err(SummaryError::extraction(file_name, "invalid document header"));
        }
        let pages = self
            .documents
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .ok_or_else(|| SummaryError::extraction(file_name, "no pages registered"))?;
        Ok(ExtractedText::new(pages))
    }
}

// --- In-Memory Sink ---

#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    saved: Arc<Mutex<Vec<(String, Summary)>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<(String, Summary)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarySink for InMemorySink {
    async fn save(&self, summary: &Summary) -> Result<String, SummaryError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.saved
            .lock()
            .unwrap()
            .push((id.clone(), summary.clone()));
        Ok(id)
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

    /// Generates a PDF with one page per entry of `pages`, each showing its text in Helvetica.
    ///
    /// Only ASCII text round-trips reliably through the built-in font encoding.
    pub fn generate_test_pdf(pages: &[&str]) -> Result<Vec<u8>> {
        build_pdf(pages.len(), |index, content| {
            content.show(Str(pages[index].as_bytes()));
        })
    }

    /// Generates a one-page PDF that draws `runs` with a single `TJ` operator, placing
    /// `offset` (thousandths of an em) between consecutive runs.
    pub fn generate_adjusted_text_pdf(runs: &[&str], offset: f32) -> Result<Vec<u8>> {
        build_pdf(1, |_, content| {
            let mut positioned = content.show_positioned();
            let mut items = positioned.items();
            for (i, run) in runs.iter().enumerate() {
                if i > 0 {
                    items.adjust(offset);
                }
                items.show(Str(run.as_bytes()));
            }
        })
    }

    fn build_pdf(page_count: usize, mut draw: impl FnMut(usize, &mut Content)) -> Result<Vec<u8>> {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let font_name = Name(b"F1");

        let page_ids: Vec<Ref> = (0..page_count)
            .map(|i| Ref::new(4 + 2 * i as i32))
            .collect();

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_count as i32);
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        for (index, page_id) in page_ids.iter().enumerate() {
            let content_id = Ref::new(page_id.get() + 1);

            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, 595.0, 842.0));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(font_name, font_id);
            page.finish();

            let mut content = Content::new();
            content.begin_text();
            content.set_font(font_name, 14.0);
            content.next_line(72.0, 760.0);
            draw(index, &mut content);
            content.end_text();
            pdf.stream(content_id, &content.finish());
        }

        Ok(pdf.finish())
    }
}
