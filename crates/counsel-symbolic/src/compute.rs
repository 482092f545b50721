use std::collections::HashMap;

use counsel_core::symbolic::{SymbolicComparison, SymbolicVariable};

/// Stage 4 of spec §4.4: evaluate each proposed comparison exactly in
/// decimal arithmetic using the stored symbol values. The LLM proposed the
/// *structure*; this function is the only place arithmetic actually
/// happens. Comparisons referencing an unresolved symbol are left with
/// `result: None` — marked `needs_lookup`, never fabricated.
pub fn compute(
    symbols: &HashMap<String, SymbolicVariable>,
    comparisons: Vec<SymbolicComparison>,
) -> Vec<SymbolicComparison> {
    comparisons
        .into_iter()
        .map(|mut cmp| {
            let lhs = symbols.get(&cmp.lhs_symbol);
            let rhs = symbols.get(&cmp.rhs_symbol);
            cmp.result = match (lhs, rhs) {
                (Some(l), Some(r)) => Some(cmp.op.apply(l.value, r.value)),
                _ => None,
            };
            cmp
        })
        .collect()
}

/// Render a single comparison as a verdict clause suitable for appending to
/// prose, e.g. `"£51,000 > £50,000 ⇒ exceeds limit by £1,000"`.
pub fn verdict_clause(symbols: &HashMap<String, SymbolicVariable>, comparison: &SymbolicComparison) -> Option<String> {
    let lhs = symbols.get(&comparison.lhs_symbol)?;
    let rhs = symbols.get(&comparison.rhs_symbol)?;
    let satisfied = comparison.result?;

    let difference = (lhs.value - rhs.value).abs();
    let relation = if satisfied {
        match comparison.op {
            counsel_core::symbolic::ComparisonOp::Lt | counsel_core::symbolic::ComparisonOp::Le => {
                format!("within {} by {}", comparison.rhs_role, counsel_core::format_gbp(difference))
            }
            counsel_core::symbolic::ComparisonOp::Gt | counsel_core::symbolic::ComparisonOp::Ge => {
                format!("exceeds {} by {}", comparison.rhs_role, counsel_core::format_gbp(difference))
            }
            _ => format!("matches {}", comparison.rhs_role),
        }
    } else {
        format!("does not satisfy {}", comparison.rhs_role)
    };

    Some(format!("{} {} {} ⇒ {}", lhs.surface, comparison.op.as_str(), rhs.surface, relation))
}

/// Replace every `[AMOUNT_N]` symbol in `text` with its original surface
/// form, the inverse of [`crate::symbolize::symbolize`].
pub fn back_substitute(text: &str, symbols: &[SymbolicVariable]) -> String {
    let mut out = text.to_string();
    for var in symbols {
        out = out.replace(&var.symbol, &var.surface);
    }
    out
}
