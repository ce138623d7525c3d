use crate::catalog::Provider;
use thiserror::Error;

/// Errors raised by a single provider client while talking to its upstream API.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    Request(reqwest::Error),
    #[error("AI provider did not answer within the configured timeout")]
    Timeout,
    #[error("AI provider returned status {status}: {body}")]
    Api { status: u16, body: String },
}

impl ProviderError {
    /// Classifies a transport error, separating timeouts from other failures.
    ///
    /// The request URL is stripped because it can carry the API key as a query parameter.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Request(err.without_url())
        }
    }
}

/// Custom error types for the summarization pipeline.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Invalid summary request: {0}")]
    InvalidRequest(String),
    #[error("Failed to extract text from '{file_name}': {reason}")]
    Extraction { file_name: String, reason: String },
    #[error("Unknown or missing model key: '{0}'")]
    InvalidModel(String),
    #[error("No client is configured for provider {0:?}")]
    ProviderUnavailable(Provider),
    #[error("AI provider call failed: {0}")]
    ProviderCall(#[from] ProviderError),
    #[error("Failed to parse summary items from model output: {0}")]
    SummaryParse(#[from] serde_json::Error),
    #[error("Failed to persist summary: {0}")]
    Persistence(String),
}

impl SummaryError {
    pub fn extraction(file_name: impl Into<String>, reason: impl ToString) -> Self {
        SummaryError::Extraction {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }

    /// The HTTP status class an outer API layer should report for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            SummaryError::InvalidRequest(_) | SummaryError::InvalidModel(_) => 400,
            SummaryError::Extraction { .. } => 422,
            SummaryError::ProviderCall(ProviderError::Timeout) => 504,
            SummaryError::ProviderCall(_) | SummaryError::SummaryParse(_) => 502,
            SummaryError::ProviderUnavailable(_) | SummaryError::Persistence(_) => 500,
        }
    }
}
