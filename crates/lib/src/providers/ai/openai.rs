use crate::{
    catalog::ProviderEndpoints,
    errors::ProviderError,
    prompts::summary::CHAT_SYSTEM_PROMPT,
    providers::ai::{AiProvider, EMPTY_ITEMS_PAYLOAD},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.2;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

// --- OpenAI Provider implementation ---

/// A provider for the OpenAI chat completions API, reached through the proxy.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: ReqwestClient,
    endpoints: ProviderEndpoints,
    api_key: String,
}

impl Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    /// Creates a new `OpenAiProvider` whose requests give up after `timeout`.
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
impl AiProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ProviderError> {
        let api_url = self.endpoints.openai_chat_completions();
        let request_body = ChatRequest {
            model: model_id,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: CHAT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        debug!(%api_url, model_id, prompt_chars = prompt.len(), "--> Sending prompt to OpenAI");

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
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

        let content = serde_json::from_str::<ChatResponse>(&body)
            .ok()
            .and_then(ChatResponse::first_content);

        match content {
            Some(content) => Ok(content),
            None => {
                warn!("OpenAI response did not contain a message; treating it as an empty result.");
                Ok(EMPTY_ITEMS_PAYLOAD.to_string())
            }
        }
    }
}
