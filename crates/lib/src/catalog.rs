//! # Model Catalog
//!
//! The fixed set of models a caller may select for summarization. Each entry pairs a
//! short symbolic key with the provider that serves it and the provider-native model
//! identifier. The table is a `const` and never changes at runtime.

use crate::errors::SummaryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The upstream vendor family behind a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    Gemini,
    OpenAi,
}

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelOption {
    Gemini20FlashLite,
    Gemini20Flash,
    Gpt4o,
    Gpt41Mini,
}

impl ModelOption {
    /// Every catalog entry, in display order.
    pub const ALL: [ModelOption; 4] = [
        ModelOption::Gemini20FlashLite,
        ModelOption::Gemini20Flash,
        ModelOption::Gpt4o,
        ModelOption::Gpt41Mini,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ModelOption::Gemini20FlashLite => "GEMINI_20_FLASH_LITE",
            ModelOption::Gemini20Flash => "GEMINI_20_FLASH",
            ModelOption::Gpt4o => "GPT_4O",
            ModelOption::Gpt41Mini => "GPT_41_MINI",
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            ModelOption::Gemini20FlashLite | ModelOption::Gemini20Flash => Provider::Gemini,
            ModelOption::Gpt4o | ModelOption::Gpt41Mini => Provider::OpenAi,
        }
    }

    pub fn model_id(self) -> &'static str {
        match self {
            ModelOption::Gemini20FlashLite => "gemini-2.0-flash-lite",
            ModelOption::Gemini20Flash => "gemini-2.0-flash",
            ModelOption::Gpt4o => "gpt-4o",
            ModelOption::Gpt41Mini => "gpt-4.1-mini",
        }
    }

    /// Resolves a user-supplied key to a catalog entry.
    ///
    /// Matching is case-insensitive against both the symbolic key and the native model
    /// identifier. Blank or unknown keys are rejected; there is no fallback model.
    pub fn resolve(key: &str) -> Result<ModelOption, SummaryError> {
        let wanted = key.trim();
        if wanted.is_empty() {
            return Err(SummaryError::InvalidModel(key.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|option| {
                option.key().eq_ignore_ascii_case(wanted)
                    || option.model_id().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| SummaryError::InvalidModel(key.to_string()))
    }
}

impl fmt::Display for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for ModelOption {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for ModelOption {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ModelOption::resolve(&raw).map_err(serde::de::Error::custom)
    }
}

/// Builds provider endpoints that all route through one upstream proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    base_url: String,
}

impl ProviderEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The Gemini-style "generate content" endpoint for `model_id`.
    pub fn gemini_generate_content(&self, model_id: &str) -> String {
        format!(
            "{}/gemini/v1beta/models/{model_id}:generateContent",
            self.base_url
        )
    }

    /// The fixed OpenAI-style chat completions endpoint.
    pub fn openai_chat_completions(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.base_url)
    }
}
