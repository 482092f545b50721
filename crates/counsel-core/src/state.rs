use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::llm::Message;
use crate::symbolic::{SymbolicComparison, SymbolicVariable};
use crate::tree_types::TreeResult;

/// Complexity classification produced by the analyze node (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Unknown,
}

/// Client-supplied financial values keyed by role (`debt`, `income`,
/// `assets`, ...). A non-empty map at entry obliges the graph to produce a
/// `tree_result` (spec §3 invariants).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientValues(pub HashMap<String, f64>);

impl ClientValues {
    pub fn get(&self, role: &str) -> Option<f64> {
        self.0.get(role).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One audited tool invocation (spec §3: `tool_calls`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub args: serde_json::Value,
    pub result: serde_json::Value,
}

/// One step of the reasoning trail surfaced in `QueryResult::reasoning_steps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: String,
    pub description: String,
    pub result: String,
}

/// The single mutable record threaded through every graph node (spec §3).
///
/// Nodes never mutate a state in place; each takes a state by value and
/// returns a newly derived one (`AgentState { field: new_value, ..state }`),
/// so every node is independently testable against a fixture state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub question: String,
    pub client_values: Option<ClientValues>,
    pub topic: String,
    pub complexity: Complexity,
    pub suggested_searches: Vec<String>,
    pub context_chunks: Vec<Chunk>,
    pub symbolic_variables: HashMap<String, SymbolicVariable>,
    pub symbolic_comparisons: Vec<SymbolicComparison>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub tool_iteration: u32,
    pub answer: String,
    pub confidence: f64,
    pub confidence_reason: String,
    pub sources: Vec<String>,
    pub tree_result: Option<TreeResult>,
    pub messages: Vec<Message>,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub cancelled: bool,
    pub error: Option<String>,
}

impl AgentState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            client_values: None,
            topic: String::new(),
            complexity: Complexity::Unknown,
            suggested_searches: Vec::new(),
            context_chunks: Vec::new(),
            symbolic_variables: HashMap::new(),
            symbolic_comparisons: Vec::new(),
            tool_calls: Vec::new(),
            tool_iteration: 0,
            answer: String::new(),
            confidence: 0.5,
            confidence_reason: String::new(),
            sources: Vec::new(),
            tree_result: None,
            messages: Vec::new(),
            reasoning_steps: Vec::new(),
            cancelled: false,
            error: None,
        }
    }

    pub fn with_client_values(mut self, values: ClientValues) -> Self {
        self.client_values = Some(values);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Append a chunk, enforcing the no-duplicate-by-`chunk_id` invariant
    /// (spec §3). Returns `true` if the chunk was newly added.
    pub fn push_chunk_deduped(&mut self, chunk: Chunk) -> bool {
        if self.context_chunks.iter().any(|c| c.chunk_id == chunk.chunk_id) {
            return false;
        }
        self.context_chunks.push(chunk);
        true
    }

    pub fn record_tool_call(&mut self, name: impl Into<String>, args: serde_json::Value, result: serde_json::Value) {
        self.tool_calls.push(ToolCallRecord { name: name.into(), args, result });
    }

    pub fn push_step(&mut self, step: impl Into<String>, description: impl Into<String>, result: impl Into<String>) {
        self.reasoning_steps.push(ReasoningStep {
            step: step.into(),
            description: description.into(),
            result: result.into(),
        });
    }
}
