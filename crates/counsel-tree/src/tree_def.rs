use serde::{Deserialize, Serialize};

use counsel_core::{Operator, Verdict};

/// A single `CONDITION` leaf (spec §3, §4.8): compares one client value
/// against a named threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionNode {
    pub node_id: String,
    /// Human label surfaced in `CriterionResult.criterion`, e.g. `"debt"`.
    pub criterion: String,
    /// Key into `client_values`, e.g. `"debt"`, `"income"`, `"assets"`.
    pub variable: String,
    /// Normalized key into the `ThresholdCache`, e.g. `"dro_maximum_debt"`.
    pub threshold_name: String,
    pub operator: Operator,
    /// Role used to look up the near-miss tolerance fraction (spec §4.8
    /// "Tolerance defaults"), e.g. `"debt"`, `"income"`, `"assets"`.
    pub tolerance_role: String,
}

/// A node in a criterion tree (spec §3 glossary "DecisionTree").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TreeNode {
    #[serde(rename = "CONDITION")]
    Condition(ConditionNode),
    #[serde(rename = "RULE_AND")]
    RuleAnd { node_id: String, children: Vec<TreeNode> },
    #[serde(rename = "RULE_OR")]
    RuleOr { node_id: String, children: Vec<TreeNode> },
    #[serde(rename = "OUTCOME")]
    Outcome { node_id: String, verdict: Verdict, label: String },
}

impl TreeNode {
    pub fn node_id(&self) -> &str {
        match self {
            TreeNode::Condition(c) => &c.node_id,
            TreeNode::RuleAnd { node_id, .. } => node_id,
            TreeNode::RuleOr { node_id, .. } => node_id,
            TreeNode::Outcome { node_id, .. } => node_id,
        }
    }
}
