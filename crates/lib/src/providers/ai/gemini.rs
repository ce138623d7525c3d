use crate::{
    catalog::ProviderEndpoints,
    errors::ProviderError,
    providers::ai::{AiProvider, EMPTY_ITEMS_PAYLOAD},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::Duration;
use tracing::{debug, warn};

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: Option<String>,
}

impl GeminiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// --- Gemini Provider implementation ---

/// A provider for the Google Gemini "generate content" API, reached through the proxy.
#[derive(Clone)]
pub struct GeminiProvider {
    client: ReqwestClient,
    endpoints: ProviderEndpoints,
    api_key: String,
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` whose requests give up after `timeout`.
    pub fn new(
        endpoints: ProviderEndpoints,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            endpoints,
            api_key,
        })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ProviderError> {
        let api_url = self.endpoints.gemini_generate_content(model_id);
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(%api_url, prompt_chars = prompt.len(), "--> Sending prompt to Gemini");

        let response = self
            .client
            .post(&api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ProviderError::from_transport)?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = serde_json::from_str::<GeminiResponse>(&body)
            .ok()
            .and_then(GeminiResponse::first_text);

        match text {
            Some(text) => Ok(text),
            None => {
                warn!("Gemini response did not contain candidate text; treating it as an empty result.");
                Ok(EMPTY_ITEMS_PAYLOAD.to_string())
            }
        }
    }
}
