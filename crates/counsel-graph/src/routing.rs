use counsel_core::{AgentState, Complexity};

/// Keywords that force numerically-sensitive questions through the
/// symbolic reasoning node even when the analyze node under-classified
/// them (spec §4.1: "`reasoning` contains a numeric keyword").
const NUMERIC_KEYWORDS: &[&str] = &["debt", "income", "limit", "threshold", "£", "$"];

/// Name of the next node to run. `"end"` means the graph terminates.
pub const NODE_SYMBOLIC: &str = "symbolic";
pub const NODE_SYNTHESIZE: &str = "synthesize";
pub const NODE_TREE_EVAL: &str = "tree_eval";
pub const NODE_END: &str = "end";

fn analyze_reasoning(state: &AgentState) -> &str {
    state
        .reasoning_steps
        .iter()
        .find(|s| s.step == "analyze")
        .map(|s| s.result.as_str())
        .unwrap_or(state.question.as_str())
}

/// Pure routing function (spec §4.1): inspects `complexity` and the
/// analyze node's reasoning text, returns the next node's name. Never
/// touches I/O or mutates state.
pub fn route_by_complexity(state: &AgentState) -> &'static str {
    if state.complexity == Complexity::Complex {
        return NODE_SYMBOLIC;
    }

    let reasoning = analyze_reasoning(state).to_lowercase();
    if NUMERIC_KEYWORDS.iter().any(|kw| reasoning.contains(kw)) {
        NODE_SYMBOLIC
    } else {
        NODE_SYNTHESIZE
    }
}

/// Pure routing function (spec §4.1): `"tree_eval"` iff `client_values` is
/// non-empty, else `"end"`.
pub fn route_by_eligibility(state: &AgentState) -> &'static str {
    match &state.client_values {
        Some(values) if !values.is_empty() => NODE_TREE_EVAL,
        _ => NODE_END,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use counsel_core::ClientValues;

    use super::*;

    #[test]
    fn complex_always_routes_to_symbolic() {
        let mut state = AgentState::new("q");
        state.complexity = Complexity::Complex;
        assert_eq!(route_by_complexity(&state), NODE_SYMBOLIC);
    }

    #[test]
    fn simple_without_numeric_keywords_routes_to_synthesize() {
        let mut state = AgentState::new("What is breathing space?");
        state.complexity = Complexity::Simple;
        state.push_step("analyze", "d", "single definition lookup");
        assert_eq!(route_by_complexity(&state), NODE_SYNTHESIZE);
    }

    #[test]
    fn moderate_with_numeric_keyword_in_reasoning_routes_to_symbolic() {
        let mut state = AgentState::new("q");
        state.complexity = Complexity::Moderate;
        state.push_step("analyze", "d", "asks about the debt threshold");
        assert_eq!(route_by_complexity(&state), NODE_SYMBOLIC);
    }

    #[test]
    fn falls_back_to_question_text_when_no_analyze_step_recorded() {
        let state = AgentState::new("Is £51,000 over the limit?");
        assert_eq!(route_by_complexity(&state), NODE_SYMBOLIC);
    }

    #[test]
    fn empty_client_values_routes_to_end() {
        let state = AgentState::new("q");
        assert_eq!(route_by_eligibility(&state), NODE_END);
    }

    #[test]
    fn non_empty_client_values_routes_to_tree_eval() {
        let mut values = HashMap::new();
        values.insert("debt".to_string(), 45000.0);
        let state = AgentState::new("q").with_client_values(ClientValues(values));
        assert_eq!(route_by_eligibility(&state), NODE_TREE_EVAL);
    }
}
