use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use counsel_core::{CounselError, LlmClient, LlmTurn, Message as CoreMessage, Result, ToolInvocation, ToolSpec};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Anthropic Messages API wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize, Clone)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    input: serde_json::Value,
}

/// Concrete `LlmClient` backed by the Anthropic Messages API. No provider
/// type leaks past this struct; every other crate talks to `LlmClient`
/// (spec §9).
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("failed to build reqwest client");

        Self { client, api_key: api_key.into(), model: model.into() }
    }

    async fn call(
        &self,
        system: &str,
        messages: &[CoreMessage],
        tools: Vec<WireTool>,
        max_tokens: u32,
    ) -> Result<AnthropicResponse> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages: messages.iter().map(|m| WireMessage { role: m.role.clone(), content: m.content.clone() }).collect(),
            tools,
        };

        debug!(model = %self.model, "sending request to Anthropic API");

        let resp = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CounselError::Llm(format!("HTTP request to Anthropic failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|_| "<unreadable body>".into());
            return Err(CounselError::Llm(format!("Anthropic API returned {status}: {body}")));
        }

        resp.json().await.map_err(|e| CounselError::Llm(format!("failed to parse Anthropic response: {e}")))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn invoke(&self, system: &str, messages: &[CoreMessage], max_tokens: u32) -> Result<String> {
        let response = self.call(system, messages, Vec::new(), max_tokens).await?;

        let text = response.content.into_iter().filter(|b| b.block_type == "text").map(|b| b.text).collect::<Vec<_>>().join("");

        if text.is_empty() {
            return Err(CounselError::Llm("Anthropic returned an empty response".into()));
        }

        Ok(text)
    }

    async fn invoke_with_tools(
        &self,
        system: &str,
        messages: &[CoreMessage],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<LlmTurn> {
        let wire_tools = tools
            .iter()
            .map(|t| WireTool { name: t.name.clone(), description: t.description.clone(), input_schema: t.input_schema.clone() })
            .collect();

        let response = self.call(system, messages, wire_tools, max_tokens).await?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block.block_type.as_str() {
                "text" => text.push_str(&block.text),
                "tool_use" => tool_calls.push(ToolInvocation { name: block.name, args: block.input }),
                other => debug!(block_type = other, "ignoring unrecognized content block type"),
            }
        }

        debug!(stop_reason = ?response.stop_reason, tool_call_count = tool_calls.len(), "received Anthropic API response");

        Ok(LlmTurn { text, tool_calls })
    }
}
