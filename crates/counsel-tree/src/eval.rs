use counsel_core::{
    ClientValues, CriterionResult, CriterionStatus, Likelihood, NearMiss, Priority, Recommendation,
    Strategy, ThresholdCache, ToleranceDefaults, TreeResult, Verdict,
};

use crate::tree_def::TreeNode;

/// Propagated status while walking the tree (spec §4.8 steps 3-4); wider
/// than [`CriterionStatus`] because `RULE_AND` can produce a `requires_review`
/// that no single condition carries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombinedStatus {
    Eligible,
    NotEligible,
    NearMiss,
    RequiresReview,
    Unknown,
}

impl From<CriterionStatus> for CombinedStatus {
    fn from(status: CriterionStatus) -> Self {
        match status {
            CriterionStatus::Eligible => CombinedStatus::Eligible,
            CriterionStatus::NearMiss => CombinedStatus::NearMiss,
            CriterionStatus::NotEligible => CombinedStatus::NotEligible,
            CriterionStatus::Unknown => CombinedStatus::Unknown,
        }
    }
}

struct Eval {
    status: CombinedStatus,
    criteria: Vec<CriterionResult>,
    near_misses: Vec<NearMiss>,
    unknown_count: usize,
    path: Vec<String>,
}

fn eval_condition(
    node: &crate::tree_def::ConditionNode,
    client_values: &ClientValues,
    thresholds: &ThresholdCache,
    tolerances: &ToleranceDefaults,
) -> Eval {
    let client_value = client_values.get(&node.variable);
    let threshold_entry = thresholds.get(&node.threshold_name);

    let (status, gap, explanation) = match (client_value, threshold_entry) {
        (Some(value), Some(entry)) => {
            let threshold = entry.amount;
            let gap = (value - threshold).abs();
            let tolerance = tolerances.fraction_for(&node.tolerance_role) * threshold;

            if node.operator.apply(value, threshold) {
                (
                    CriterionStatus::Eligible,
                    Some(gap),
                    format!(
                        "{} of {} satisfies {} {} {}",
                        node.criterion,
                        counsel_core::format_gbp(value),
                        node.operator.as_str(),
                        counsel_core::format_gbp(threshold),
                        node.threshold_name
                    ),
                )
            } else if gap <= tolerance {
                (
                    CriterionStatus::NearMiss,
                    Some(gap),
                    format!(
                        "{} of {} is within {} of the {} limit of {}",
                        node.criterion,
                        counsel_core::format_gbp(value),
                        counsel_core::format_gbp(gap),
                        node.threshold_name,
                        counsel_core::format_gbp(threshold)
                    ),
                )
            } else {
                (
                    CriterionStatus::NotEligible,
                    Some(gap),
                    format!(
                        "{} of {} fails {} {} {}",
                        node.criterion,
                        counsel_core::format_gbp(value),
                        node.operator.as_str(),
                        counsel_core::format_gbp(threshold),
                        node.threshold_name
                    ),
                )
            }
        }
        (None, _) => (
            CriterionStatus::Unknown,
            None,
            format!("no client value supplied for '{}'", node.variable),
        ),
        (_, None) => (
            CriterionStatus::Unknown,
            None,
            format!("threshold '{}' is not cached", node.threshold_name),
        ),
    };

    let criterion_result = CriterionResult {
        criterion: node.criterion.clone(),
        threshold_name: node.threshold_name.clone(),
        threshold_value: threshold_entry.map(|e| e.amount),
        client_value,
        status,
        gap,
        operator: node.operator,
        explanation,
    };

    let near_misses = if status == CriterionStatus::NearMiss {
        let tolerance = threshold_entry.map(|e| tolerances.fraction_for(&node.tolerance_role) * e.amount).unwrap_or(0.0);
        vec![NearMiss {
            threshold_name: node.threshold_name.clone(),
            tolerance,
            gap: gap.unwrap_or(0.0),
            strategies: remediation_strategies(node, gap.unwrap_or(0.0)),
        }]
    } else {
        Vec::new()
    };

    Eval {
        status: status.into(),
        criteria: vec![criterion_result],
        near_misses,
        unknown_count: (status == CriterionStatus::Unknown) as usize,
        path: vec![node.node_id.clone()],
    }
}

fn remediation_strategies(node: &crate::tree_def::ConditionNode, gap: f64) -> Vec<counsel_core::Strategy> {
    let formatted_gap = counsel_core::format_gbp(gap);
    match node.operator {
        counsel_core::Operator::Le | counsel_core::Operator::Lt => vec![Strategy {
            description: format!("Reduce {} by {formatted_gap} to meet {}", node.criterion, node.threshold_name),
            actions: vec![format!("Lower {} by at least {formatted_gap}", node.criterion)],
            likelihood: Likelihood::Medium,
        }],
        counsel_core::Operator::Ge | counsel_core::Operator::Gt => vec![Strategy {
            description: format!("Increase {} by {formatted_gap} to meet {}", node.criterion, node.threshold_name),
            actions: vec![format!("Raise {} by at least {formatted_gap}", node.criterion)],
            likelihood: Likelihood::Medium,
        }],
        _ => Vec::new(),
    }
}

fn combine_and(children: Vec<Eval>) -> Eval {
    let any_not_eligible = children.iter().any(|c| c.status == CombinedStatus::NotEligible);
    let any_unknown = children.iter().any(|c| c.status == CombinedStatus::Unknown);
    let all_eligible = children.iter().all(|c| c.status == CombinedStatus::Eligible);

    // spec §4.9: a missing variable is `unknown`, and the verdict becomes
    // `incomplete_information` unless another branch decides — here, "decides"
    // means a sibling that is itself `not_eligible`, which dominates because the
    // conjunction already fails regardless of what the unknown branch would say.
    let status = if any_not_eligible {
        CombinedStatus::NotEligible
    } else if any_unknown {
        CombinedStatus::Unknown
    } else if all_eligible {
        CombinedStatus::Eligible
    } else {
        CombinedStatus::RequiresReview
    };

    merge(status, children)
}

fn combine_or(children: Vec<Eval>) -> Eval {
    let known: Vec<&Eval> = children.iter().filter(|c| c.status != CombinedStatus::Unknown).collect();

    let status = if known.is_empty() {
        CombinedStatus::Unknown
    } else if known.iter().any(|c| c.status == CombinedStatus::Eligible) {
        CombinedStatus::Eligible
    } else if known.iter().any(|c| c.status == CombinedStatus::NearMiss) {
        CombinedStatus::NearMiss
    } else if known.iter().any(|c| c.status == CombinedStatus::RequiresReview) {
        CombinedStatus::RequiresReview
    } else {
        CombinedStatus::NotEligible
    };

    merge(status, children)
}

fn merge(status: CombinedStatus, children: Vec<Eval>) -> Eval {
    let mut criteria = Vec::new();
    let mut near_misses = Vec::new();
    let mut unknown_count = 0;
    let mut path = Vec::new();

    for child in children {
        criteria.extend(child.criteria);
        near_misses.extend(child.near_misses);
        unknown_count += child.unknown_count;
        path.extend(child.path);
    }

    Eval { status, criteria, near_misses, unknown_count, path }
}

fn eval_node(
    node: &TreeNode,
    client_values: &ClientValues,
    thresholds: &ThresholdCache,
    tolerances: &ToleranceDefaults,
) -> Eval {
    match node {
        TreeNode::Condition(c) => eval_condition(c, client_values, thresholds, tolerances),
        TreeNode::RuleAnd { node_id, children } => {
            let child_evals: Vec<Eval> =
                children.iter().map(|c| eval_node(c, client_values, thresholds, tolerances)).collect();
            let mut eval = combine_and(child_evals);
            eval.path.insert(0, node_id.clone());
            eval
        }
        TreeNode::RuleOr { node_id, children } => {
            let child_evals: Vec<Eval> =
                children.iter().map(|c| eval_node(c, client_values, thresholds, tolerances)).collect();
            let mut eval = combine_or(child_evals);
            eval.path.insert(0, node_id.clone());
            eval
        }
        TreeNode::Outcome { node_id, verdict, .. } => Eval {
            status: match verdict {
                Verdict::Eligible => CombinedStatus::Eligible,
                Verdict::NotEligible => CombinedStatus::NotEligible,
                Verdict::RequiresReview => CombinedStatus::RequiresReview,
                Verdict::IncompleteInformation => CombinedStatus::Unknown,
            },
            criteria: Vec::new(),
            near_misses: Vec::new(),
            unknown_count: 0,
            path: vec![node_id.clone()],
        },
    }
}

fn combined_to_verdict(status: CombinedStatus) -> Verdict {
    match status {
        CombinedStatus::Eligible => Verdict::Eligible,
        CombinedStatus::NotEligible => Verdict::NotEligible,
        CombinedStatus::NearMiss | CombinedStatus::RequiresReview => Verdict::RequiresReview,
        CombinedStatus::Unknown => Verdict::IncompleteInformation,
    }
}

/// Most-restrictive-bound tie-break (spec §4.8 "Tie-breaks"): when the same
/// variable surfaces a near-miss via more than one condition, only the
/// tightest gap is kept.
fn dedup_near_misses(mut near_misses: Vec<NearMiss>) -> Vec<NearMiss> {
    near_misses.sort_by(|a, b| a.threshold_name.cmp(&b.threshold_name).then(a.gap.partial_cmp(&b.gap).unwrap()));
    near_misses.dedup_by(|a, b| a.threshold_name == b.threshold_name);
    near_misses
}

fn build_recommendations(near_misses: &[NearMiss]) -> Vec<Recommendation> {
    near_misses
        .iter()
        .flat_map(|nm| {
            nm.strategies.iter().map(move |strategy| Recommendation {
                kind: "near_miss_remediation".to_string(),
                priority: Priority::High,
                action: strategy.description.clone(),
                steps: strategy.actions.clone(),
            })
        })
        .collect()
}

/// Evaluate a full criterion tree against client values (spec §4.8).
pub fn evaluate(
    tree: &TreeNode,
    client_values: &ClientValues,
    thresholds: &ThresholdCache,
    tolerances: &ToleranceDefaults,
) -> TreeResult {
    let eval = eval_node(tree, client_values, thresholds, tolerances);
    let near_misses = dedup_near_misses(eval.near_misses);
    let recommendations = build_recommendations(&near_misses);
    let confidence = (1.0 - 0.1 * eval.unknown_count as f64).max(0.3);

    TreeResult {
        verdict: combined_to_verdict(eval.status),
        criteria: eval.criteria,
        near_misses,
        recommendations,
        confidence,
        path: eval.path,
    }
}
