pub mod gemini;
pub mod openai;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// The literal payload returned when a successful response lacks the expected shape.
///
/// The pipeline parses it as "no items produced" rather than as a failure.
pub const EMPTY_ITEMS_PAYLOAD: &str = "[]";

/// A trait for interacting with an AI provider.
///
/// Every concrete client owns its request/response envelope and reduces the provider's
/// reply to a flat text payload.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Sends `prompt` to the provider-native model `model_id` and returns the raw text reply.
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(AiProvider);
