use std::sync::Arc;

use counsel_core::{LlmClient, LlmFactory};

use crate::anthropic::AnthropicClient;
use crate::timeout::TimeoutLlmClient;

/// Builds an Anthropic-backed `LlmClient` per call, wrapped in
/// [`TimeoutLlmClient`] (spec §5 per-LLM-call budget). A fresh client per
/// distinct model keeps the per-call `model` option (spec §6.1/§6.2)
/// honored without caching provider state the core never sees.
pub struct AnthropicLlmFactory {
    api_key: String,
    default_model: String,
    timeout_ms: u64,
}

impl AnthropicLlmFactory {
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>, timeout_ms: u64) -> Self {
        Self { api_key: api_key.into(), default_model: default_model.into(), timeout_ms }
    }
}

impl LlmFactory for AnthropicLlmFactory {
    fn for_model(&self, model: Option<&str>) -> Arc<dyn LlmClient> {
        let model = model.unwrap_or(&self.default_model);
        let client = AnthropicClient::new(self.api_key.clone(), model);
        Arc::new(TimeoutLlmClient::new(Arc::new(client), self.timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_model_when_none_given() {
        let factory = AnthropicLlmFactory::new("key", "claude-sonnet-4-5-20250929", 20_000);
        let _client = factory.for_model(None);
    }

    #[test]
    fn honors_explicit_model_override() {
        let factory = AnthropicLlmFactory::new("key", "claude-sonnet-4-5-20250929", 20_000);
        let _client = factory.for_model(Some("claude-haiku-4-5"));
    }
}
