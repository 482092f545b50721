use tracing::{info, instrument, warn};

use counsel_core::{AgentState, CancellationToken, CriterionResult, Result, TreeResult, Verdict};
use counsel_nodes::{AnalyzeNode, RetrieveNode, SymbolicNode, SynthesizeNode, TreeEvalNode};

use crate::routing::{route_by_complexity, route_by_eligibility, NODE_SYMBOLIC, NODE_TREE_EVAL};

/// Builds a `TreeResult` for when the registered tree itself could not be
/// built (spec §7: `TreeBuildError` — "topic unknown or cache insufficient;
/// `evaluate_eligibility` returns `incomplete_information`"). Unlike a
/// missing client value (handled inside `counsel-tree`'s own evaluator),
/// this is a structural failure the graph surfaces as a terminal,
/// well-formed result rather than propagating the error to the caller.
fn incomplete_information_result() -> TreeResult {
    TreeResult {
        verdict: Verdict::IncompleteInformation,
        criteria: Vec::<CriterionResult>::new(),
        near_misses: Vec::new(),
        recommendations: Vec::new(),
        confidence: 0.3,
        path: Vec::new(),
    }
}

/// Declarative wiring of the workflow described in spec §4.1:
///
/// ```text
/// entry -> analyze -> retrieve -> route_by_complexity
/// route_by_complexity: {simple, moderate} -> synthesize ; {complex | numeric} -> symbolic
/// symbolic -> synthesize
/// synthesize -> route_by_eligibility
/// route_by_eligibility: client_values present -> tree_eval ; otherwise -> END
/// tree_eval -> END
/// ```
///
/// Every node that calls the LLM or the vector store is a suspension
/// point; `run` checks the cancellation token immediately before each one
/// (spec §5). `route_by_complexity`/`route_by_eligibility` and tree
/// evaluation itself are pure and never suspend.
pub struct AgentGraph {
    analyze: AnalyzeNode,
    retrieve: RetrieveNode,
    symbolic: SymbolicNode,
    synthesize: SynthesizeNode,
    tree_eval: TreeEvalNode,
    symbolic_enabled: bool,
}

impl AgentGraph {
    pub fn new(
        analyze: AnalyzeNode,
        retrieve: RetrieveNode,
        symbolic: SymbolicNode,
        synthesize: SynthesizeNode,
        tree_eval: TreeEvalNode,
        symbolic_enabled: bool,
    ) -> Self {
        Self { analyze, retrieve, symbolic, synthesize, tree_eval, symbolic_enabled }
    }

    #[instrument(skip(self, state, cancel))]
    pub async fn run(&self, mut state: AgentState, cancel: &CancellationToken) -> Result<AgentState> {
        if cancel.is_cancelled() {
            state.cancelled = true;
            return Ok(state);
        }
        state = self.analyze.run(state).await?;

        if cancel.is_cancelled() {
            state.cancelled = true;
            return Ok(state);
        }
        state = self.retrieve.run(state).await?;

        if self.symbolic_enabled && route_by_complexity(&state) == NODE_SYMBOLIC {
            if cancel.is_cancelled() {
                state.cancelled = true;
                return Ok(state);
            }
            state = self.symbolic.run(state).await?;
        }

        if cancel.is_cancelled() {
            state.cancelled = true;
            return Ok(state);
        }
        state = self.synthesize.run(state).await?;

        if route_by_eligibility(&state) == NODE_TREE_EVAL {
            if cancel.is_cancelled() {
                state.cancelled = true;
                return Ok(state);
            }
            match self.tree_eval.run(state.clone()).await {
                Ok(next) => state = next,
                Err(e) => {
                    warn!(error = %e, topic = %state.topic, "tree evaluation failed, terminating with incomplete_information");
                    state.error = Some(e.to_string());
                    state.tree_result = Some(incomplete_information_result());
                    state.push_step("tree_eval", "tree build failed", e.to_string());
                }
            }
        }

        info!(confidence = state.confidence, sources = state.sources.len(), "graph run complete");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use counsel_core::{ClientValues, LlmClient, Message, ThresholdCache, ToleranceDefaults, VectorStore};
    use counsel_tree::TreeRegistry;
    use counsel_vectorstore::InMemoryVectorStore;

    use super::*;

    struct ScriptedLlm {
        analyze: String,
        synth: String,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn invoke(&self, system: &str, _messages: &[Message], _max_tokens: u32) -> Result<String> {
            if system.contains("classify") {
                Ok(self.analyze.clone())
            } else {
                Ok("[]".to_string())
            }
        }

        async fn invoke_with_tools(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[counsel_core::ToolSpec],
            _max_tokens: u32,
        ) -> Result<counsel_core::LlmTurn> {
            Ok(counsel_core::LlmTurn { text: self.synth.clone(), tool_calls: Vec::new() })
        }
    }

    fn build_graph(llm: Arc<dyn LlmClient>) -> AgentGraph {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new(vec![counsel_core::Chunk::new(
            "Breathing space pauses interest and enforcement for up to 60 days.",
            "breathing_space.pdf",
            "c1",
        )]));
        let thresholds = ThresholdCache::empty();
        let tools = counsel_tools::tool_registry(thresholds.clone());
        AgentGraph::new(
            AnalyzeNode::new(llm.clone()),
            RetrieveNode::new(store, thresholds.clone(), 4),
            SymbolicNode::new(llm.clone()),
            SynthesizeNode::new(llm, tools, 3),
            TreeEvalNode::new(TreeRegistry::build(&thresholds), thresholds, ToleranceDefaults::default()),
            true,
        )
    }

    #[tokio::test]
    async fn simple_question_skips_symbolic_and_tree_eval() {
        let llm = Arc::new(ScriptedLlm {
            analyze: r#"{"complexity":"simple","reasoning":"definition lookup","suggested_searches":["breathing space"]}"#.to_string(),
            synth: "Breathing space pauses enforcement. CONFIDENCE: HIGH - from manual".to_string(),
        });
        let graph = build_graph(llm);
        let cancel = CancellationToken::new();
        let state = graph.run(AgentState::new("What is breathing space?"), &cancel).await.unwrap();
        assert!(state.symbolic_comparisons.is_empty());
        assert!(state.tree_result.is_none());
        assert!(!state.cancelled);
        assert!((state.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn client_values_present_produces_tree_result() {
        let llm = Arc::new(ScriptedLlm {
            analyze: r#"{"complexity":"complex","reasoning":"eligibility check","suggested_searches":["dro limit"]}"#.to_string(),
            synth: "You may be eligible. CONFIDENCE: 0.8".to_string(),
        });
        let graph = build_graph(llm);
        let cancel = CancellationToken::new();
        let mut values = std::collections::HashMap::new();
        values.insert("debt".to_string(), 10_000.0);
        let state = graph
            .run(
                AgentState::new("Am I eligible for a DRO?").with_client_values(ClientValues(values)).with_topic("dro_eligibility"),
                &cancel,
            )
            .await
            .unwrap();
        assert!(state.tree_result.is_some());
    }

    #[tokio::test]
    async fn cancelled_before_start_short_circuits_immediately() {
        let llm = Arc::new(ScriptedLlm {
            analyze: r#"{"complexity":"simple","suggested_searches":["q"]}"#.to_string(),
            synth: "answer".to_string(),
        });
        let graph = build_graph(llm);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let state = graph.run(AgentState::new("q"), &cancel).await.unwrap();
        assert!(state.cancelled);
        assert!(state.answer.is_empty());
    }

    #[tokio::test]
    async fn unknown_topic_yields_incomplete_information_without_propagating_error() {
        let llm = Arc::new(ScriptedLlm {
            analyze: r#"{"complexity":"complex","reasoning":"eligibility","suggested_searches":["q"]}"#.to_string(),
            synth: "answer. CONFIDENCE: 0.5".to_string(),
        });
        let graph = build_graph(llm);
        let cancel = CancellationToken::new();
        let mut values = std::collections::HashMap::new();
        values.insert("debt".to_string(), 1000.0);
        let state = graph
            .run(AgentState::new("q").with_client_values(ClientValues(values)).with_topic("not_a_real_topic"), &cancel)
            .await
            .unwrap();
        assert_eq!(state.tree_result.unwrap().verdict, Verdict::IncompleteInformation);
        assert!(state.error.is_some());
    }
}
