use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use counsel_core::{CounselError, LlmClient, LlmTurn, Message, Result, ToolSpec};

/// Wraps an `LlmClient` so every call is bounded by the per-LLM-call budget
/// (spec §5: "Per-LLM-call budget (default 20s). On LLM timeout: treat as
/// LLM failure"). Mirrors the `timed()` helper around Qdrant calls in
/// `counsel-vectorstore` — a decorator around the capability trait rather
/// than a change to any one provider.
pub struct TimeoutLlmClient {
    inner: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl TimeoutLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, timeout_ms: u64) -> Self {
        Self { inner, timeout: Duration::from_millis(timeout_ms) }
    }
}

#[async_trait]
impl LlmClient for TimeoutLlmClient {
    async fn invoke(&self, system: &str, messages: &[Message], max_tokens: u32) -> Result<String> {
        tokio::time::timeout(self.timeout, self.inner.invoke(system, messages, max_tokens))
            .await
            .map_err(|_| CounselError::Llm(format!("LLM call timed out after {}ms", self.timeout.as_millis())))?
    }

    async fn invoke_with_tools(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<LlmTurn> {
        tokio::time::timeout(self.timeout, self.inner.invoke_with_tools(system, messages, tools, max_tokens))
            .await
            .map_err(|_| CounselError::Llm(format!("LLM call timed out after {}ms", self.timeout.as_millis())))?
    }
}
