use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use counsel_core::{
    AgentState, CancellationToken, ClientValues, ClientValuesInput, EligibilityOptions, EligibilityResult,
    EngineConfig, LlmFactory, QueryOptions, QueryResult, ThresholdCache, VectorStore,
};
use counsel_graph::AgentGraph;
use counsel_nodes::{AnalyzeNode, RetrieveNode, SymbolicNode, SynthesizeNode, TreeEvalNode};
use counsel_tree::TreeRegistry;
use counsel_vectorstore::BootstrapGuard;

/// The public surface of the core (spec §1: "exposes two entry points").
/// Holds everything that lives for the process lifetime — the threshold
/// cache, the tree registry built from it, the vector store, and the LLM
/// factory — and builds a fresh [`AgentGraph`] per call so that per-request
/// options (`top_k`, `max_iterations`, `model`) never leak across queries.
pub struct CounselEngine {
    config: EngineConfig,
    vector_store: Arc<dyn VectorStore>,
    llm_factory: Arc<dyn LlmFactory>,
    thresholds: ThresholdCache,
    trees: TreeRegistry,
}

impl CounselEngine {
    /// Runs the threshold-cache bootstrap exactly once (spec §4.7, §5) and
    /// builds the tree registry from its result. Call once at process
    /// startup; the returned engine serves queries for the rest of the
    /// process lifetime ("rebuilding requires a restart", spec §3).
    #[instrument(skip(vector_store, llm_factory, config))]
    pub async fn bootstrap(
        config: EngineConfig,
        vector_store: Arc<dyn VectorStore>,
        llm_factory: Arc<dyn LlmFactory>,
    ) -> Self {
        let guard = BootstrapGuard::new();
        let bootstrap_llm = llm_factory.for_model(None);
        let thresholds = match counsel_vectorstore::bootstrap_once(
            &guard,
            vector_store.clone(),
            bootstrap_llm,
            &config.cache_bootstrap_query,
            config.cache_bootstrap_min_entries,
        )
        .await
        {
            Some(Ok(cache)) => cache,
            Some(Err(e)) => {
                warn!(error = %e, "threshold cache bootstrap failed, starting with an empty cache");
                ThresholdCache::empty()
            }
            None => ThresholdCache::empty(),
        };

        let trees = TreeRegistry::build(&thresholds);

        Self { config, vector_store, llm_factory, thresholds, trees }
    }

    /// Constructs an engine around an already-populated threshold cache,
    /// skipping bootstrap. Used by tests and by callers that manage the
    /// cache lifecycle themselves.
    pub fn with_thresholds(
        config: EngineConfig,
        vector_store: Arc<dyn VectorStore>,
        llm_factory: Arc<dyn LlmFactory>,
        thresholds: ThresholdCache,
    ) -> Self {
        let trees = TreeRegistry::build(&thresholds);
        Self { config, vector_store, llm_factory, thresholds, trees }
    }

    fn build_graph(&self, llm: Arc<dyn counsel_core::LlmClient>, top_k: usize, max_iterations: u32) -> AgentGraph {
        AgentGraph::new(
            AnalyzeNode::new(llm.clone()),
            RetrieveNode::new(self.vector_store.clone(), self.thresholds.clone(), top_k),
            SymbolicNode::new(llm.clone()),
            SynthesizeNode::new(llm.clone(), counsel_tools::tool_registry(self.thresholds.clone()), max_iterations),
            TreeEvalNode::new(self.trees.clone(), self.thresholds.clone(), self.config.tolerance_defaults.clone()),
            self.config.symbolic_enabled,
        )
    }

    /// Runs the graph under the query-level wall-clock budget (spec §5),
    /// returning the final state or a `BudgetExceeded` marker on timeout.
    async fn run_with_budget(&self, state: AgentState, graph: &AgentGraph, cancel: &CancellationToken) -> AgentState {
        let budget = Duration::from_millis(self.config.query_timeout_ms);
        match tokio::time::timeout(budget, graph.run(state, cancel)).await {
            Ok(Ok(final_state)) => final_state,
            Ok(Err(e)) => {
                warn!(error = %e, "graph run returned an unrecoverable error");
                let mut fallback = AgentState::new("");
                fallback.answer = format!("Unable to produce an answer: {e}");
                fallback.error = Some(e.to_string());
                fallback.confidence = 0.0;
                fallback.confidence_reason = "graph run failed".to_string();
                fallback
            }
            Err(_) => {
                cancel.cancel();
                warn!(budget_ms = self.config.query_timeout_ms, "query exceeded its wall-clock budget");
                let mut fallback = AgentState::new("");
                fallback.answer = "Unable to produce an answer within the query time budget.".to_string();
                fallback.error = Some(format!("query exceeded {}ms budget", self.config.query_timeout_ms));
                fallback.confidence = 0.0;
                fallback.confidence_reason = "budget exceeded".to_string();
                fallback
            }
        }
    }

    /// `answer_query` (spec §6.1): classify, retrieve, optionally reason
    /// symbolically, synthesize a cited answer, extract confidence. Never
    /// raises to the caller — every failure mode is folded into the
    /// returned `QueryResult` (spec §7).
    #[instrument(skip(self, options))]
    pub async fn answer_query(&self, question: &str, options: QueryOptions) -> QueryResult {
        if question.trim().is_empty() {
            return QueryResult {
                answer: String::new(),
                sources: Vec::new(),
                iterations_used: 0,
                confidence: "0% - question was empty".to_string(),
                reasoning_steps: None,
                error: Some("question must be non-empty".to_string()),
            };
        }

        let llm = self.llm_factory.for_model(options.model.as_deref());
        let graph = self.build_graph(llm, options.top_k, options.max_iterations);
        let cancel = CancellationToken::new();
        let state = self.run_with_budget(AgentState::new(question), &graph, &cancel).await;

        QueryResult {
            answer: state.answer,
            sources: state.sources,
            iterations_used: state.tool_iteration,
            confidence: format!("{:.0}% - {}", state.confidence * 100.0, state.confidence_reason),
            reasoning_steps: options.show_reasoning.then_some(state.reasoning_steps),
            error: state.error,
        }
    }

    /// `evaluate_eligibility` (spec §6.2): same graph, with `client_values`
    /// and `topic` set on the initial state so `route_by_eligibility`
    /// reaches `tree_eval` (spec invariant: "If `client_values` is present
    /// at entry, the graph must produce `tree_result`").
    #[instrument(skip(self, client_values, options))]
    pub async fn evaluate_eligibility(
        &self,
        question: &str,
        client_values: ClientValuesInput,
        topic: &str,
        options: EligibilityOptions,
    ) -> EligibilityResult {
        let llm = self.llm_factory.for_model(options.model.as_deref());
        let graph = self.build_graph(llm, self.config.default_top_k, self.config.max_tool_iterations);
        let cancel = CancellationToken::new();

        let initial = AgentState::new(question).with_client_values(ClientValues(client_values)).with_topic(topic);
        let state = self.run_with_budget(initial, &graph, &cancel).await;

        let tree_result = state.tree_result.unwrap_or_else(|| counsel_core::TreeResult {
            verdict: counsel_core::Verdict::IncompleteInformation,
            criteria: Vec::new(),
            near_misses: Vec::new(),
            recommendations: Vec::new(),
            confidence: 0.3,
            path: Vec::new(),
        });

        let diagram = if options.include_diagram && !tree_result.path.is_empty() {
            Some(tree_result.path.join(" -> "))
        } else {
            None
        };

        EligibilityResult {
            answer: state.answer,
            overall_result: tree_result.verdict,
            confidence: tree_result.confidence,
            criteria: tree_result.criteria,
            near_misses: tree_result.near_misses,
            recommendations: tree_result.recommendations,
            sources: state.sources,
            diagram,
            error: state.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use counsel_core::{Chunk, LlmClient, LlmTurn, Message, ThresholdEntry, ToolSpec, Verdict};
    use counsel_vectorstore::InMemoryVectorStore;

    use super::*;

    struct FixedLlm {
        analyze: String,
        synth: String,
    }

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn invoke(&self, system: &str, _messages: &[Message], _max_tokens: u32) -> counsel_core::Result<String> {
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
            _tools: &[ToolSpec],
            _max_tokens: u32,
        ) -> counsel_core::Result<LlmTurn> {
            Ok(LlmTurn { text: self.synth.clone(), tool_calls: Vec::new() })
        }
    }

    struct FixedFactory {
        analyze: String,
        synth: String,
    }

    impl LlmFactory for FixedFactory {
        fn for_model(&self, _model: Option<&str>) -> Arc<dyn LlmClient> {
            Arc::new(FixedLlm { analyze: self.analyze.clone(), synth: self.synth.clone() })
        }
    }

    fn dro_thresholds() -> ThresholdCache {
        let mut entries = HashMap::new();
        entries.insert(
            "dro_maximum_debt".to_string(),
            ThresholdEntry { amount: 50_000.0, formatted: "£50,000.00".to_string(), source: "dro_rules.pdf".to_string() },
        );
        entries.insert(
            "dro_income_limit".to_string(),
            ThresholdEntry { amount: 75.0, formatted: "£75.00".to_string(), source: "dro_rules.pdf".to_string() },
        );
        entries.insert(
            "dro_asset_limit".to_string(),
            ThresholdEntry { amount: 2_000.0, formatted: "£2,000.00".to_string(), source: "dro_rules.pdf".to_string() },
        );
        ThresholdCache::new(entries)
    }

    fn test_engine(analyze: &str, synth: &str) -> CounselEngine {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new(vec![Chunk::new(
            "Breathing space pauses interest and enforcement action for up to 60 days.",
            "breathing_space.pdf",
            "c1",
        )]));
        let factory: Arc<dyn LlmFactory> = Arc::new(FixedFactory { analyze: analyze.to_string(), synth: synth.to_string() });
        CounselEngine::with_thresholds(EngineConfig::default(), store, factory, dro_thresholds())
    }

    #[tokio::test]
    async fn answer_query_rejects_empty_question() {
        let engine = test_engine("{}", "answer");
        let result = engine.answer_query("   ", QueryOptions::default()).await;
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn answer_query_definition_question_is_high_confidence_with_sources() {
        let engine = test_engine(
            r#"{"complexity":"simple","reasoning":"definition lookup","suggested_searches":["breathing space"]}"#,
            "Breathing space pauses enforcement for 60 days. CONFIDENCE: HIGH - directly from manual",
        );
        let result = engine.answer_query("What is breathing space?", QueryOptions::default()).await;
        assert!(result.error.is_none());
        assert!(!result.sources.is_empty());
        assert!(result.confidence.starts_with("90%"));
    }

    #[tokio::test]
    async fn evaluate_eligibility_dro_eligible() {
        let engine = test_engine(
            r#"{"complexity":"complex","reasoning":"eligibility check","suggested_searches":["dro limit"]}"#,
            "You appear eligible. CONFIDENCE: 0.9",
        );
        let mut values = HashMap::new();
        values.insert("debt".to_string(), 45_000.0);
        values.insert("income".to_string(), 50.0);
        values.insert("assets".to_string(), 1_000.0);

        let result = engine
            .evaluate_eligibility("Am I eligible for a DRO?", values, "dro_eligibility", EligibilityOptions::default())
            .await;

        assert_eq!(result.overall_result, Verdict::Eligible);
        assert_eq!(result.criteria.len(), 3);
        assert!(result.near_misses.is_empty());
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn evaluate_eligibility_unknown_topic_is_incomplete_information() {
        let engine = test_engine(
            r#"{"complexity":"complex","reasoning":"eligibility","suggested_searches":["q"]}"#,
            "answer. CONFIDENCE: 0.5",
        );
        let mut values = HashMap::new();
        values.insert("debt".to_string(), 1_000.0);

        let result = engine
            .evaluate_eligibility("q", values, "not_a_registered_topic", EligibilityOptions::default())
            .await;

        assert_eq!(result.overall_result, Verdict::IncompleteInformation);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn evaluate_eligibility_diagram_only_rendered_when_requested() {
        let engine = test_engine(
            r#"{"complexity":"complex","reasoning":"eligibility check","suggested_searches":["dro limit"]}"#,
            "eligible. CONFIDENCE: 0.9",
        );
        let mut values = HashMap::new();
        values.insert("debt".to_string(), 45_000.0);
        values.insert("income".to_string(), 50.0);
        values.insert("assets".to_string(), 1_000.0);

        let without_diagram = engine
            .evaluate_eligibility("q", values.clone(), "dro_eligibility", EligibilityOptions::default())
            .await;
        assert!(without_diagram.diagram.is_none());

        let with_diagram = engine
            .evaluate_eligibility(
                "q",
                values,
                "dro_eligibility",
                EligibilityOptions { include_diagram: true, model: None },
            )
            .await;
        assert!(with_diagram.diagram.is_some());
    }
}
