use tracing::instrument;

use counsel_core::{AgentState, Result, ThresholdCache, ToleranceDefaults};
use counsel_tree::TreeRegistry;

/// Evaluates the registered decision tree for `state.topic` against
/// `state.client_values`. Only reached when the graph's eligibility routing
/// has already confirmed client values are present.
pub struct TreeEvalNode {
    registry: TreeRegistry,
    thresholds: ThresholdCache,
    tolerances: ToleranceDefaults,
}

impl TreeEvalNode {
    pub fn new(registry: TreeRegistry, thresholds: ThresholdCache, tolerances: ToleranceDefaults) -> Self {
        Self { registry, thresholds, tolerances }
    }

    #[instrument(skip(self, state))]
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState> {
        let Some(client_values) = state.client_values.clone() else {
            return Ok(state);
        };

        let result = self.registry.evaluate(&state.topic, &client_values, &self.thresholds, &self.tolerances)?;

        state.push_step(
            "tree_eval",
            "evaluated the registered decision tree against client values",
            result.verdict.as_str().to_string(),
        );
        state.tree_result = Some(result);

        Ok(state)
    }
}
