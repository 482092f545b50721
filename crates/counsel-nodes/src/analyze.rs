use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, warn};

use counsel_core::{AgentState, Complexity, LlmClient, Message, Result};

const MAX_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = "You classify a debt-advice question and propose search queries. \
Respond with a JSON object and nothing else: \
{\"complexity\": \"simple\"|\"moderate\"|\"complex\", \"reasoning\": string, \
\"suggested_searches\": [string, ...] (1 to 3 entries), \"requires_symbolic\": bool}. \
Use \"simple\" for a single definition or lookup, \"moderate\" for a procedure or a synthesis \
of two concepts, \"complex\" for a multi-criterion comparison, scenario, or numerical \
eligibility question.";

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    complexity: String,
    #[serde(default)]
    reasoning: String,
    suggested_searches: Vec<String>,
    #[serde(default)]
    requires_symbolic: bool,
}

fn parse_complexity(raw: &str) -> Complexity {
    match raw.to_lowercase().as_str() {
        "simple" => Complexity::Simple,
        "moderate" => Complexity::Moderate,
        "complex" => Complexity::Complex,
        _ => Complexity::Unknown,
    }
}

fn extract_json_object(text: &str) -> &str {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &text[s..=e],
        _ => text,
    }
}

/// Classifies the question and proposes search queries. Falls back to
/// moderate complexity with the question as the sole search query when the
/// LLM call or its output cannot be parsed, so the graph always has
/// something to retrieve with.
pub struct AnalyzeNode {
    llm: Arc<dyn LlmClient>,
}

impl AnalyzeNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, state))]
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState> {
        let question = state.question.clone();

        let outcome = match self.llm.invoke(SYSTEM_PROMPT, &[Message::user(question.clone())], MAX_TOKENS).await {
            Ok(text) => parse_analysis(&text, &question),
            Err(e) => {
                warn!(error = %e, "analyze node LLM call failed, falling back to moderate complexity");
                fallback_analysis(&question)
            }
        };

        state.push_step("analyze", "classified question and proposed search queries", &outcome.reasoning);
        state.complexity = outcome.complexity;
        state.suggested_searches = outcome.suggested_searches;

        Ok(state)
    }
}

struct AnalysisOutcome {
    complexity: Complexity,
    suggested_searches: Vec<String>,
    reasoning: String,
}

fn fallback_analysis(question: &str) -> AnalysisOutcome {
    AnalysisOutcome {
        complexity: Complexity::Moderate,
        suggested_searches: vec![question.to_string()],
        reasoning: "fallback: question used directly as the only search query".to_string(),
    }
}

fn parse_analysis(text: &str, question: &str) -> AnalysisOutcome {
    let json_slice = extract_json_object(text);
    match serde_json::from_str::<RawAnalysis>(json_slice) {
        Ok(raw) if !raw.suggested_searches.is_empty() => AnalysisOutcome {
            complexity: parse_complexity(&raw.complexity),
            suggested_searches: raw.suggested_searches.into_iter().take(3).collect(),
            reasoning: raw.reasoning,
        },
        Ok(_) => {
            warn!("analyze node LLM returned no suggested searches, falling back");
            fallback_analysis(question)
        }
        Err(e) => {
            warn!(error = %e, "could not parse analyze node output, falling back");
            fallback_analysis(question)
        }
    }
}
