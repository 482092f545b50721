use counsel_core::symbolic::SymbolicVariable;

const UNIFY_TOLERANCE: f64 = 0.01;

/// Stage 2 of spec §4.4: context symbols unify with question symbols when
/// their values match within absolute tolerance. Unified context variables
/// are dropped in favor of the question's existing symbol so a single
/// amount that appears in both the question and a retrieved chunk gets one
/// symbol, not two.
pub fn unify(question_vars: &[SymbolicVariable], context_vars: Vec<SymbolicVariable>) -> (Vec<SymbolicVariable>, Vec<(String, String)>) {
    let mut unified = Vec::new();
    let mut renames = Vec::new();

    for var in context_vars {
        let existing = question_vars
            .iter()
            .chain(unified.iter())
            .find(|q| q.unit == var.unit && (q.value - var.value).abs() <= UNIFY_TOLERANCE);

        match existing {
            Some(matched) => renames.push((var.symbol.clone(), matched.symbol.clone())),
            None => unified.push(var),
        }
    }

    (unified, renames)
}

/// Apply the symbol renames produced by [`unify`] to a symbolized text,
/// collapsing duplicate context symbols onto their question counterparts.
pub fn apply_renames(text: &str, renames: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (from, to) in renames {
        out = out.replace(from.as_str(), to.as_str());
    }
    out
}
