use serde::{Deserialize, Serialize};

/// Unit attached to an extracted numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Gbp,
    Usd,
    Eur,
    Percent,
    Count,
}

/// A placeholder substituted for a currency/number literal so the LLM never
/// sees raw arithmetic (spec §4.4, glossary "Symbol").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolicVariable {
    pub symbol: String,
    pub surface: String,
    pub value: f64,
    pub unit: Unit,
    /// Semantic label assigned post-hoc by keyword heuristics (e.g.
    /// `client_debt`, `dro_limit`); `None` until role discovery runs.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl ComparisonOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Ge => lhs >= rhs,
            ComparisonOp::Eq => (lhs - rhs).abs() < f64::EPSILON,
            ComparisonOp::Ne => (lhs - rhs).abs() >= f64::EPSILON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
        }
    }
}

/// A comparison the LLM proposed by role, computed exactly over the stored
/// symbol values (spec §4.4 stage 3-4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolicComparison {
    pub lhs_role: String,
    pub op: ComparisonOp,
    pub rhs_role: String,
    pub lhs_symbol: String,
    pub rhs_symbol: String,
    /// `None` when an operand's value could not be resolved — marked
    /// `needs_lookup` and skipped rather than fabricated.
    pub result: Option<bool>,
}
