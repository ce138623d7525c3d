//! Persists finished summaries as pretty-printed JSON files, one per summary.

use anycite::{Summary, SummaryError, SummarySink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SummarySink for JsonFileSink {
    /// Writes `<dir>/<uuid>.json` and returns the uuid.
    async fn save(&self, summary: &Summary) -> Result<String, SummaryError> {
        let id = uuid::Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{id}.json"));

        let body = serde_json::to_vec_pretty(summary)
            .map_err(|e| SummaryError::Persistence(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SummaryError::Persistence(format!("cannot create '{}': {e}", self.dir.display()))
        })?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            SummaryError::Persistence(format!("cannot write '{}': {e}", path.display()))
        })?;

        debug!("Wrote summary to '{}'.", path.display());
        Ok(id)
    }
}
