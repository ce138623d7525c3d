use crate::{errors::SummaryError, types::Summary};
use async_trait::async_trait;

/// Receives finished summaries for storage.
///
/// The pipeline only calls a sink after a run fully succeeded, so an implementation never
/// sees a partial summary.
#[async_trait]
pub trait SummarySink: Send + Sync {
    /// Stores `summary` together with its document links and returns its stored identifier.
    async fn save(&self, summary: &Summary) -> Result<String, SummaryError>;
}
