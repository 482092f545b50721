use std::collections::HashMap;
use std::sync::Arc;

use tracing::{instrument, warn};

use counsel_core::{AgentState, LlmClient, Message, Result, ToolSpec};
use counsel_llm::{extract_confidence, parse_tool_call_fallback};
use counsel_tools::Tool;

const MAX_TOKENS: u32 = 1536;

const SYSTEM_PROMPT: &str = "You are a debt-advice assistant. Answer using only the numbered \
sources provided; cite them as [Source N]. Invoke a tool for any arithmetic instead of \
computing it yourself. When you are done, end your answer with a line of the form \
\"CONFIDENCE: <0..1> - <short reason>\".";

fn build_prompt(state: &AgentState) -> String {
    let mut sections = Vec::new();

    for (i, chunk) in state.context_chunks.iter().enumerate() {
        sections.push(format!("[Source {}: {}]\n{}", i + 1, chunk.source, chunk.text));
    }

    if !state.symbolic_comparisons.is_empty() {
        let clauses: Vec<String> = state
            .symbolic_comparisons
            .iter()
            .filter_map(|c| counsel_symbolic::compute::verdict_clause(&state.symbolic_variables, c))
            .collect();
        if !clauses.is_empty() {
            sections.push(format!("[Computed comparisons]\n{}", clauses.join("\n")));
        }
    }

    sections.push(format!("Question: {}", state.question));
    sections.join("\n\n")
}

fn tool_specs(tools: &HashMap<String, Arc<dyn Tool>>) -> Vec<ToolSpec> {
    tools
        .values()
        .map(|t| ToolSpec { name: t.name().to_string(), description: t.description().to_string(), input_schema: t.input_schema() })
        .collect()
}

fn format_tool_results(results: &[(String, serde_json::Value, serde_json::Value)]) -> String {
    results
        .iter()
        .map(|(name, args, result)| format!("Tool `{name}` called with {args} returned: {result}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the synthesis prompt, runs the tool-calling loop against the LLM,
/// and extracts a final confidence score. On LLM failure the node returns an
/// error answer with confidence 0.0 rather than propagating a partial guess.
pub struct SynthesizeNode {
    llm: Arc<dyn LlmClient>,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_iterations: u32,
}

impl SynthesizeNode {
    pub fn new(llm: Arc<dyn LlmClient>, tools: HashMap<String, Arc<dyn Tool>>, max_tool_iterations: u32) -> Self {
        Self { llm, tools, max_tool_iterations }
    }

    #[instrument(skip(self, state))]
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState> {
        let specs = tool_specs(&self.tools);
        let mut messages = vec![Message::user(build_prompt(&state))];
        let confidence_cap = if state.context_chunks.is_empty() { Some(0.4) } else { None };

        let mut final_text = String::new();

        loop {
            let turn = match self.llm.invoke_with_tools(SYSTEM_PROMPT, &messages, &specs, MAX_TOKENS).await {
                Ok(turn) => turn,
                Err(e) => {
                    warn!(error = %e, "synthesis LLM call failed");
                    state.answer = format!("Unable to produce an answer: {e}");
                    state.confidence = 0.0;
                    state.confidence_reason = "LLM call failed".to_string();
                    state.error = Some(e.to_string());
                    return Ok(state);
                }
            };

            let mut invocations = turn.tool_calls;
            if invocations.is_empty() {
                invocations = parse_tool_call_fallback(&turn.text);
            }

            if invocations.is_empty() || state.tool_iteration >= self.max_tool_iterations {
                final_text = turn.text;
                break;
            }

            messages.push(Message::assistant(turn.text));

            let mut results = Vec::with_capacity(invocations.len());
            for call in invocations {
                let result = match self.tools.get(&call.name) {
                    Some(tool) => tool.execute(&call.args),
                    None => serde_json::json!({"error": format!("unknown tool '{}'", call.name)}),
                };
                state.record_tool_call(call.name.clone(), call.args.clone(), result.clone());
                results.push((call.name, call.args, result));
            }

            state.tool_iteration += 1;
            messages.push(Message::user(format_tool_results(&results)));
        }

        let (mut confidence, reason) = extract_confidence(&final_text);
        if let Some(cap) = confidence_cap {
            confidence = confidence.min(cap);
        }

        let answer = strip_confidence_line(&final_text);

        state.sources = dedup_sources(&state);
        state.answer = answer;
        state.confidence = confidence;
        state.confidence_reason = reason;
        state.push_step("synthesize", "built prompt, ran tool loop, extracted confidence", format!("{:.0}% confidence", confidence * 100.0));

        Ok(state)
    }
}

fn strip_confidence_line(text: &str) -> String {
    match text.to_uppercase().find("CONFIDENCE") {
        Some(idx) => text[..idx].trim_end().to_string(),
        None => text.trim_end().to_string(),
    }
}

fn dedup_sources(state: &AgentState) -> Vec<String> {
    let mut seen = Vec::new();
    for chunk in &state.context_chunks {
        if !seen.contains(&chunk.source) {
            seen.push(chunk.source.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use counsel_core::{Chunk, CounselError, LlmTurn, ToolInvocation};

    use super::*;

    struct ScriptedLlm {
        turns: Mutex<Vec<LlmTurn>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn invoke(&self, _system: &str, _messages: &[Message], _max_tokens: u32) -> Result<String> {
            unimplemented!()
        }

        async fn invoke_with_tools(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[ToolSpec],
            _max_tokens: u32,
        ) -> Result<LlmTurn> {
            let mut turns = self.turns.lock().unwrap();
            Ok(turns.remove(0))
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn invoke(&self, _system: &str, _messages: &[Message], _max_tokens: u32) -> Result<String> {
            unimplemented!()
        }

        async fn invoke_with_tools(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[ToolSpec],
            _max_tokens: u32,
        ) -> Result<LlmTurn> {
            Err(CounselError::Llm("provider unavailable".into()))
        }
    }

    fn tools() -> HashMap<String, Arc<dyn Tool>> {
        counsel_tools::tool_registry(counsel_core::ThresholdCache::empty())
    }

    #[tokio::test]
    async fn runs_tool_call_then_returns_final_answer() {
        let llm = ScriptedLlm {
            turns: Mutex::new(vec![
                LlmTurn {
                    text: "Let me check.".to_string(),
                    tool_calls: vec![ToolInvocation { name: "calculate".to_string(), args: serde_json::json!({"expression": "1+1"}) }],
                },
                LlmTurn { text: "The answer is 2. CONFIDENCE: HIGH - verified by tool".to_string(), tool_calls: vec![] },
            ]),
        };
        let node = SynthesizeNode::new(Arc::new(llm), tools(), 3);
        let mut state = AgentState::new("what is 1+1?");
        state.context_chunks.push(Chunk::new("arithmetic reference", "manual.pdf", "c1"));
        let state = node.run(state).await.unwrap();
        assert_eq!(state.tool_iteration, 1);
        assert_eq!(state.tool_calls.len(), 1);
        assert!((state.confidence - 0.9).abs() < f64::EPSILON);
        assert!(!state.answer.to_uppercase().contains("CONFIDENCE"));
    }

    #[tokio::test]
    async fn empty_context_caps_confidence_at_point_four() {
        let llm = ScriptedLlm {
            turns: Mutex::new(vec![LlmTurn { text: "Best guess. CONFIDENCE: HIGH".to_string(), tool_calls: vec![] }]),
        };
        let node = SynthesizeNode::new(Arc::new(llm), tools(), 3);
        let state = node.run(AgentState::new("q")).await.unwrap();
        assert!(state.confidence <= 0.4);
    }

    #[tokio::test]
    async fn llm_failure_yields_error_answer_with_zero_confidence() {
        let node = SynthesizeNode::new(Arc::new(FailingLlm), tools(), 3);
        let state = node.run(AgentState::new("q")).await.unwrap();
        assert_eq!(state.confidence, 0.0);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn tool_loop_stops_at_iteration_cap() {
        let mut scripted = Vec::new();
        for _ in 0..5 {
            scripted.push(LlmTurn {
                text: "still working".to_string(),
                tool_calls: vec![ToolInvocation { name: "calculate".to_string(), args: serde_json::json!({"expression": "1+1"}) }],
            });
        }
        let llm = ScriptedLlm { turns: Mutex::new(scripted) };
        let node = SynthesizeNode::new(Arc::new(llm), tools(), 2);
        let state = node.run(AgentState::new("q")).await.unwrap();
        assert_eq!(state.tool_iteration, 2);
    }
}
