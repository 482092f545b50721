use once_cell::sync::Lazy;
use regex::Regex;

use counsel_core::symbolic::{SymbolicVariable, Unit};

static LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[£$€]?\s?-?\d[\d,]*(?:\.\d+)?\s?%?").unwrap());

fn detect_unit(surface: &str) -> Unit {
    if surface.contains('£') {
        Unit::Gbp
    } else if surface.contains('$') {
        Unit::Usd
    } else if surface.contains('€') {
        Unit::Eur
    } else if surface.trim_end().ends_with('%') {
        Unit::Percent
    } else {
        Unit::Count
    }
}

fn parse_value(surface: &str) -> Option<f64> {
    let cleaned: String = surface
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Stage 1/2 of spec §4.4: replace every currency/number literal in `text`
/// with a fresh `[AMOUNT_N]` symbol. `next_id` is the running counter shared
/// across the question and every context chunk, so symbols are unique
/// within a single query.
pub fn symbolize(text: &str, next_id: &mut usize) -> (String, Vec<SymbolicVariable>) {
    let mut variables = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for mat in LITERAL_RE.find_iter(text) {
        let surface = mat.as_str();
        let Some(value) = parse_value(surface) else {
            continue;
        };

        out.push_str(&text[last_end..mat.start()]);
        let symbol = format!("[AMOUNT_{}]", *next_id);
        *next_id += 1;
        out.push_str(&symbol);
        last_end = mat.end();

        variables.push(SymbolicVariable {
            symbol,
            surface: surface.trim().to_string(),
            value,
            unit: detect_unit(surface),
            role: None,
        });
    }
    out.push_str(&text[last_end..]);

    (out, variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_currency_literals_with_symbols() {
        let mut next_id = 0;
        let (symbolized, vars) = symbolize("Their debt is £51,000 against a £50,000 limit", &mut next_id);
        assert_eq!(symbolized, "Their debt is [AMOUNT_0] against a [AMOUNT_1] limit");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].value, 51000.0);
        assert_eq!(vars[1].value, 50000.0);
        assert_eq!(vars[0].unit, Unit::Gbp);
    }

    #[test]
    fn continues_symbol_counter_across_calls() {
        let mut next_id = 0;
        let (_, q) = symbolize("£51,000", &mut next_id);
        let (_, c) = symbolize("£50,000", &mut next_id);
        assert_eq!(q[0].symbol, "[AMOUNT_0]");
        assert_eq!(c[0].symbol, "[AMOUNT_1]");
    }

    #[test]
    fn leaves_text_without_numbers_untouched() {
        let mut next_id = 0;
        let (symbolized, vars) = symbolize("no numbers in this sentence", &mut next_id);
        assert_eq!(symbolized, "no numbers in this sentence");
        assert!(vars.is_empty());
    }
}
