use counsel_core::{normalize_threshold_name, Operator, ThresholdCache};

use crate::tree_def::{ConditionNode, TreeNode};

/// Builds the tree for one registered topic from the threshold cache (spec
/// §4.8: "A tree for a topic is built once from ThresholdCache"). Missing
/// threshold names are tolerated here — a `CONDITION` node is still built,
/// it simply evaluates to `unknown` at traversal time since there is no
/// cached entry to compare against (spec §4.9 "Tree node missing variable").
pub fn build_dro_tree() -> TreeNode {
    and_of_conditions(
        "dro_root",
        &[
            ("debt", "debt", "dro_maximum_debt", Operator::Le, "debt"),
            ("income", "income", "dro_income_limit", Operator::Le, "income"),
            ("assets", "assets", "dro_asset_limit", Operator::Le, "assets"),
        ],
    )
}

pub fn build_iva_tree() -> TreeNode {
    and_of_conditions(
        "iva_root",
        &[
            ("debt", "debt", "iva_minimum_debt", Operator::Ge, "debt"),
            ("monthly_payment", "monthly_payment", "iva_minimum_monthly_payment", Operator::Ge, "monthly_payment"),
        ],
    )
}

pub fn build_bankruptcy_tree() -> TreeNode {
    and_of_conditions(
        "bankruptcy_root",
        &[("debt", "debt", "bankruptcy_minimum_debt", Operator::Ge, "debt")],
    )
}

fn and_of_conditions(
    root_id: &str,
    specs: &[(&str, &str, &str, Operator, &str)],
) -> TreeNode {
    let children = specs
        .iter()
        .map(|(node_id, variable, threshold_name, operator, role)| {
            TreeNode::Condition(ConditionNode {
                node_id: (*node_id).to_string(),
                criterion: (*variable).to_string(),
                variable: (*variable).to_string(),
                threshold_name: normalize_threshold_name(threshold_name),
                operator: *operator,
                tolerance_role: (*role).to_string(),
            })
        })
        .collect();

    TreeNode::RuleAnd { node_id: root_id.to_string(), children }
}

/// Build every registered tree, independent of what the cache currently
/// holds — trees are fixed shape, only thresholds come from the cache at
/// evaluation time (spec §3: "topic→tree mapping is fixed").
pub fn build_all_trees(_thresholds: &ThresholdCache) -> Vec<(&'static str, TreeNode)> {
    vec![
        ("dro_eligibility", build_dro_tree()),
        ("iva_eligibility", build_iva_tree()),
        ("bankruptcy_eligibility", build_bankruptcy_tree()),
    ]
}
