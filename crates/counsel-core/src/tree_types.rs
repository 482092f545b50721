use serde::{Deserialize, Serialize};

/// Comparison operator carried by a `CONDITION` tree node (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    /// Evaluate `value <operator> threshold`.
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Le => value <= threshold,
            Operator::Lt => value < threshold,
            Operator::Ge => value >= threshold,
            Operator::Gt => value > threshold,
            Operator::Eq => (value - threshold).abs() < f64::EPSILON,
            Operator::Ne => (value - threshold).abs() >= f64::EPSILON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Eq => "=",
            Operator::Ne => "!=",
        }
    }
}

/// Per-criterion status after traversal (spec §4.8 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Eligible,
    NearMiss,
    NotEligible,
    Unknown,
}

/// Outcome of evaluating one `CONDITION` node against a client value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: String,
    pub threshold_name: String,
    pub threshold_value: Option<f64>,
    pub client_value: Option<f64>,
    pub status: CriterionStatus,
    pub gap: Option<f64>,
    pub operator: Operator,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub description: String,
    pub actions: Vec<String>,
    pub likelihood: Likelihood,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearMiss {
    pub threshold_name: String,
    pub tolerance: f64,
    pub gap: f64,
    pub strategies: Vec<Strategy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: Priority,
    pub action: String,
    pub steps: Vec<String>,
}

/// Overall tree-evaluation outcome (spec glossary: "Verdict").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Eligible,
    NotEligible,
    RequiresReview,
    IncompleteInformation,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Eligible => "eligible",
            Verdict::NotEligible => "not_eligible",
            Verdict::RequiresReview => "requires_review",
            Verdict::IncompleteInformation => "incomplete_information",
        }
    }
}

/// Output of a full decision-tree traversal (spec §4.8 "Outputs").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResult {
    pub verdict: Verdict,
    pub criteria: Vec<CriterionResult>,
    pub near_misses: Vec<NearMiss>,
    pub recommendations: Vec<Recommendation>,
    pub confidence: f64,
    /// Node ids visited, root to leaf, for diagram rendering (spec §6.2 `diagram`).
    pub path: Vec<String>,
}
