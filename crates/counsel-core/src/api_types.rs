use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::ReasoningStep;
use crate::tree_types::{CriterionResult, NearMiss, Recommendation, Verdict};

/// Options recognized by `answer_query` (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptions {
    pub model: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_show_reasoning")]
    pub show_reasoning: bool,
}

fn default_top_k() -> usize {
    4
}
fn default_max_iterations() -> u32 {
    3
}
fn default_show_reasoning() -> bool {
    true
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            model: None,
            top_k: default_top_k(),
            max_iterations: default_max_iterations(),
            show_reasoning: default_show_reasoning(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<String>,
    pub iterations_used: u32,
    /// `"<pct>% - <reason>"`, e.g. `"90% - sourced directly from manual"`.
    pub confidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_steps: Option<Vec<ReasoningStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Options recognized by `evaluate_eligibility` (spec §6.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EligibilityOptions {
    #[serde(default)]
    pub include_diagram: bool,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub answer: String,
    pub overall_result: Verdict,
    pub confidence: f64,
    pub criteria: Vec<CriterionResult>,
    pub near_misses: Vec<NearMiss>,
    pub recommendations: Vec<Recommendation>,
    pub sources: Vec<String>,
    pub diagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Input client values for `evaluate_eligibility` (spec §6.2): `debt`,
/// `income`, `assets` and any further role the registered tree names.
pub type ClientValuesInput = HashMap<String, f64>;
