use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single turn in an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// A tool the LLM may call, described the way native tool-calling APIs
/// expect (spec §4.5: "bound to these tools via native tool-calling when
/// supported").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A tool invocation the LLM requested, whether decoded from native
/// tool-calling or from the regex-based `TOOL_CALL: {json}` fallback
/// protocol (spec §4.5, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: serde_json::Value,
}

/// Everything the LLM returned for one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmTurn {
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
}

/// Capability interface for the generative model (spec §9: "Plug-in
/// LLM/Vector store"). No provider-specific types leak past this trait;
/// `counsel-llm` supplies the concrete Anthropic-backed implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(
        &self,
        system: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String>;

    /// Invoke with native tool-calling when the provider supports it.
    /// Implementations that don't support native tool-calling may return a
    /// `LlmTurn` with an empty `tool_calls` and rely on the regex fallback
    /// protocol in the caller.
    async fn invoke_with_tools(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<LlmTurn> {
        let text = self.invoke(system, messages, max_tokens).await?;
        Ok(LlmTurn { text, tool_calls: Vec::new() })
    }
}

/// Resolves the per-call `model` option (spec §6.1, §6.2) into a concrete
/// `LlmClient` without leaking a provider type past this trait. The engine
/// asks for `None` to get its configured default.
pub trait LlmFactory: Send + Sync {
    fn for_model(&self, model: Option<&str>) -> Arc<dyn LlmClient>;
}
