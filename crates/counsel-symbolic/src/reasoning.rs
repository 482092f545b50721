use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, warn};

use counsel_core::symbolic::{ComparisonOp, SymbolicComparison, SymbolicVariable};
use counsel_core::{LlmClient, Message, Result};

use crate::compute::{back_substitute, compute, verdict_clause};
use crate::roles::discover_role;
use crate::symbolize::symbolize;
use crate::unify::{apply_renames, unify};

const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You compare already-extracted amounts by role. Amounts have been \
replaced with symbols like [AMOUNT_0]; you never see or produce raw numbers. For each \
comparison worth making, emit one JSON object with fields lhs_role, op (one of <, <=, >, >=, \
=, !=), rhs_role, lhs_symbol, rhs_symbol. Respond with a JSON array of these objects and \
nothing else. If no comparison is warranted, respond with an empty array.";

#[derive(Debug, Deserialize)]
struct RawComparison {
    lhs_role: String,
    op: String,
    rhs_role: String,
    lhs_symbol: String,
    rhs_symbol: String,
}

fn parse_op(raw: &str) -> Option<ComparisonOp> {
    match raw {
        "<" => Some(ComparisonOp::Lt),
        "<=" => Some(ComparisonOp::Le),
        ">" => Some(ComparisonOp::Gt),
        ">=" => Some(ComparisonOp::Ge),
        "=" | "==" => Some(ComparisonOp::Eq),
        "!=" => Some(ComparisonOp::Ne),
        _ => None,
    }
}

fn extract_json_array(text: &str) -> &str {
    let start = text.find('[');
    let end = text.rfind(']');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &text[s..=e],
        _ => text,
    }
}

/// Output of the full four-stage symbolic reasoning pipeline (spec §4.4).
pub struct SymbolicOutcome {
    pub comparisons: Vec<SymbolicComparison>,
    pub symbols: Vec<SymbolicVariable>,
    /// The question and context chunks with symbols back-substituted and a
    /// verdict clause appended for every resolved comparison.
    pub annotated_prose: String,
}

/// Runs the four-stage pipeline from spec §4.4: symbolize, unify, ask the
/// LLM for comparison structure, compute and back-substitute.
pub struct SymbolicReasoner {
    llm: Arc<dyn LlmClient>,
}

impl SymbolicReasoner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, question, context_chunks))]
    pub async fn reason(&self, question: &str, context_chunks: &[String]) -> Result<SymbolicOutcome> {
        let mut next_id = 0;
        let (symbolized_question, question_vars) = symbolize(question, &mut next_id);

        let mut symbolized_chunks = Vec::with_capacity(context_chunks.len());
        let mut all_context_vars = Vec::new();
        for chunk in context_chunks {
            let (symbolized, vars) = symbolize(chunk, &mut next_id);
            symbolized_chunks.push(symbolized);
            all_context_vars.extend(vars);
        }

        let (mut extra_vars, renames) = unify(&question_vars, all_context_vars);
        let symbolized_chunks: Vec<String> =
            symbolized_chunks.iter().map(|c| apply_renames(c, &renames)).collect();

        for var in extra_vars.iter_mut() {
            if var.role.is_none() {
                var.role = discover_role(&var.surface);
            }
        }

        let mut all_vars = question_vars.clone();
        all_vars.append(&mut extra_vars);

        if all_vars.is_empty() {
            return Ok(SymbolicOutcome {
                comparisons: Vec::new(),
                symbols: all_vars,
                annotated_prose: question.to_string(),
            });
        }

        let symbol_table: HashMap<String, SymbolicVariable> =
            all_vars.iter().cloned().map(|v| (v.symbol.clone(), v)).collect();

        let prompt = format!(
            "Question: {symbolized_question}\n\nContext:\n{}\n\nSymbols:\n{}",
            symbolized_chunks.join("\n---\n"),
            all_vars
                .iter()
                .map(|v| format!("{} = {} ({:?}){}", v.symbol, v.value, v.unit, v.role.as_deref().map(|r| format!(" role_hint={r}")).unwrap_or_default()))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let comparisons = match self.llm.invoke(SYSTEM_PROMPT, &[Message::user(prompt)], MAX_TOKENS).await {
            Ok(text) => parse_comparisons(&text),
            Err(e) => {
                warn!(error = %e, "symbolic reasoning LLM call failed, proceeding with no comparisons");
                Vec::new()
            }
        };

        let computed = compute(&symbol_table, comparisons);

        let mut annotated = back_substitute(&symbolized_question, &all_vars);
        for chunk in &symbolized_chunks {
            annotated.push_str("\n\n");
            annotated.push_str(&back_substitute(chunk, &all_vars));
        }
        for cmp in &computed {
            if let Some(clause) = verdict_clause(&symbol_table, cmp) {
                annotated.push_str("\n\n");
                annotated.push_str(&clause);
            }
        }

        Ok(SymbolicOutcome { comparisons: computed, symbols: all_vars, annotated_prose: annotated })
    }
}

fn parse_comparisons(text: &str) -> Vec<SymbolicComparison> {
    let json_slice = extract_json_array(text);
    let raw: Vec<RawComparison> = match serde_json::from_str(json_slice) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "could not parse symbolic comparisons from LLM output");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|r| {
            let op = parse_op(&r.op)?;
            Some(SymbolicComparison {
                lhs_role: r.lhs_role,
                op,
                rhs_role: r.rhs_role,
                lhs_symbol: r.lhs_symbol,
                rhs_symbol: r.rhs_symbol,
                result: None,
            })
        })
        .collect()
}
