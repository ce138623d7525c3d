//! # Provider Routing
//!
//! Maps the catalog's [`Provider`] enum to a concrete [`AiProvider`] instance. This is
//! the only place that knows which client serves which vendor; the pipeline just asks
//! the router for "the client for this provider".

use crate::{
    catalog::{Provider, ProviderEndpoints},
    config::ProviderSettings,
    errors::{ProviderError, SummaryError},
    providers::ai::{gemini::GeminiProvider, openai::OpenAiProvider, AiProvider},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// An immutable routing table from provider family to client.
#[derive(Debug, Clone, Default)]
pub struct ProviderRouter {
    routes: HashMap<Provider, Arc<dyn AiProvider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `client` as the handler for `provider`, replacing any previous one.
    pub fn with_route(mut self, provider: Provider, client: Arc<dyn AiProvider>) -> Self {
        self.routes.insert(provider, client);
        self
    }

    /// Builds the default Gemini and OpenAI clients from settings.
    ///
    /// A provider whose API key is missing or blank gets no route; requests for its
    /// models later fail with [`SummaryError::ProviderUnavailable`].
    pub fn from_settings(
        settings: &ProviderSettings,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let endpoints = ProviderEndpoints::new(settings.proxy_base_url.as_str());
        let mut router = Self::new();

        match non_blank(settings.gemini_api_key.as_deref()) {
            Some(key) => {
                info!("Configuring Gemini provider via {}", endpoints.base_url());
                let client = GeminiProvider::new(endpoints.clone(), key.to_string(), timeout)?;
                router = router.with_route(Provider::Gemini, Arc::new(client));
            }
            None => warn!("No Gemini API key configured; Gemini models are unavailable."),
        }

        match non_blank(settings.openai_api_key.as_deref()) {
            Some(key) => {
                info!("Configuring OpenAI provider via {}", endpoints.base_url());
                let client = OpenAiProvider::new(endpoints.clone(), key.to_string(), timeout)?;
                router = router.with_route(Provider::OpenAi, Arc::new(client));
            }
            None => warn!("No OpenAI API key configured; OpenAI models are unavailable."),
        }

        Ok(router)
    }

    /// Returns the client that serves `provider`.
    pub fn route(&self, provider: Provider) -> Result<Arc<dyn AiProvider>, SummaryError> {
        self.routes
            .get(&provider)
            .cloned()
            .ok_or(SummaryError::ProviderUnavailable(provider))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
