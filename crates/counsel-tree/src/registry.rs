use std::collections::HashMap;
use std::sync::Arc;

use counsel_core::{ClientValues, CounselError, Result, ThresholdCache, ToleranceDefaults, TreeResult};

use crate::builder::build_all_trees;
use crate::eval::evaluate;
use crate::tree_def::TreeNode;

/// Topic name → tree, built exactly once at startup (spec §5: trees are
/// "read-only after startup, safe for concurrent readers").
#[derive(Clone)]
pub struct TreeRegistry {
    trees: Arc<HashMap<String, TreeNode>>,
}

impl TreeRegistry {
    pub fn build(thresholds: &ThresholdCache) -> Self {
        let trees = build_all_trees(thresholds)
            .into_iter()
            .map(|(topic, tree)| (topic.to_string(), tree))
            .collect();
        Self { trees: Arc::new(trees) }
    }

    pub fn evaluate(
        &self,
        topic: &str,
        client_values: &ClientValues,
        thresholds: &ThresholdCache,
        tolerances: &ToleranceDefaults,
    ) -> Result<TreeResult> {
        let tree = self
            .trees
            .get(topic)
            .ok_or_else(|| CounselError::TreeBuild(format!("unknown topic '{topic}'")))?;
        Ok(evaluate(tree, client_values, thresholds, tolerances))
    }

    pub fn topics(&self) -> impl Iterator<Item = &String> {
        self.trees.keys()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as StdHashMap;

    use super::*;

    #[test]
    fn unknown_topic_returns_tree_build_error() {
        let registry = TreeRegistry::build(&ThresholdCache::empty());
        let values = ClientValues(StdHashMap::new());
        let result = registry.evaluate("not_a_topic", &values, &ThresholdCache::empty(), &ToleranceDefaults::default());
        assert!(matches!(result, Err(CounselError::TreeBuild(_))));
    }

    #[test]
    fn registered_topics_are_evaluable() {
        let registry = TreeRegistry::build(&ThresholdCache::empty());
        let values = ClientValues(StdHashMap::new());
        let result = registry.evaluate("dro_eligibility", &values, &ThresholdCache::empty(), &ToleranceDefaults::default());
        assert!(result.is_ok());
    }
}
