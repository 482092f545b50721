use std::sync::Arc;

use tracing::instrument;

use counsel_core::{AgentState, Result};
use counsel_symbolic::SymbolicReasoner;

/// Wires `SymbolicReasoner` into the graph: runs the four-stage pipeline over
/// the question and retrieved chunks, then stores the resolved comparisons
/// and symbol table on the state for synthesis to cite.
pub struct SymbolicNode {
    reasoner: SymbolicReasoner,
}

impl SymbolicNode {
    pub fn new(llm: Arc<dyn counsel_core::LlmClient>) -> Self {
        Self { reasoner: SymbolicReasoner::new(llm) }
    }

    #[instrument(skip(self, state))]
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState> {
        let chunk_texts: Vec<String> = state.context_chunks.iter().map(|c| c.text.clone()).collect();
        let outcome = self.reasoner.reason(&state.question, &chunk_texts).await?;

        state.symbolic_variables = outcome.symbols.iter().map(|v| (v.symbol.clone(), v.clone())).collect();
        state.symbolic_comparisons = outcome.comparisons;

        let resolved = state.symbolic_comparisons.iter().filter(|c| c.result.is_some()).count();
        state.push_step(
            "symbolic",
            "extracted amounts into symbols and computed comparisons exactly",
            format!("{resolved}/{} comparison(s) resolved", state.symbolic_comparisons.len()),
        );

        Ok(state)
    }
}
