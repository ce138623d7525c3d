//! # Pipeline Configuration
//!
//! Plain, deserializable settings for the pipeline and its provider clients. Loading
//! them from files or the environment is the job of the embedding application.

use serde::Deserialize;
use std::time::Duration;

/// Settings that shape a single pipeline run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// The per-document character cap applied before prompt assembly. Required.
    pub max_chars_per_document: usize,
    /// How long a provider call may take before it counts as failed.
    #[serde(
        rename = "request_timeout_secs",
        default = "default_request_timeout",
        deserialize_with = "duration_secs::deserialize"
    )]
    pub request_timeout: Duration,
    /// Drop items whose quote is not a literal substring of the cited page.
    #[serde(default)]
    pub verify_quotes: bool,
}

impl PipelineConfig {
    pub fn new(max_chars_per_document: usize) -> Self {
        Self {
            max_chars_per_document,
            request_timeout: default_request_timeout(),
            verify_quotes: false,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_quote_verification(mut self, verify_quotes: bool) -> Self {
        self.verify_quotes = verify_quotes;
        self
    }
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Credentials and the shared proxy base for the provider clients.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderSettings {
    pub proxy_base_url: String,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("proxy_base_url", &self.proxy_base_url)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
