use serde_json::json;

use crate::numeric::parse_currency;
use crate::tool::Tool;

/// Compares two currency-ish values with a given operator (spec §4.6
/// `compare_numbers`).
pub struct CompareNumbersTool;

fn apply_op(a: f64, b: f64, op: &str) -> Option<bool> {
    match op {
        "<=" | "le" => Some(a <= b),
        "<" | "lt" => Some(a < b),
        ">=" | "ge" => Some(a >= b),
        ">" | "gt" => Some(a > b),
        "==" | "eq" => Some((a - b).abs() < f64::EPSILON),
        "!=" | "ne" => Some((a - b).abs() >= f64::EPSILON),
        _ => None,
    }
}

impl Tool for CompareNumbersTool {
    fn name(&self) -> &'static str {
        "compare_numbers"
    }

    fn description(&self) -> &'static str {
        "Compare two currency-ish values with an operator (<=, <, >=, >, ==, !=)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" },
                "op": { "type": "string" }
            },
            "required": ["a", "b", "op"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let (Some(raw_a), Some(raw_b), Some(op)) = (
            args.get("a").and_then(|v| v.as_str().map(String::from).or_else(|| v.as_f64().map(|n| n.to_string()))),
            args.get("b").and_then(|v| v.as_str().map(String::from).or_else(|| v.as_f64().map(|n| n.to_string()))),
            args.get("op").and_then(|v| v.as_str()),
        ) else {
            return json!({ "error": "missing required arguments 'a', 'b', 'op'" });
        };

        let Some(a_value) = parse_currency(&raw_a) else {
            return json!({ "error": format!("could not parse '{raw_a}' as a number") });
        };
        let Some(b_value) = parse_currency(&raw_b) else {
            return json!({ "error": format!("could not parse '{raw_b}' as a number") });
        };

        let Some(result) = apply_op(a_value, b_value, op) else {
            return json!({ "error": format!("unknown operator '{op}'") });
        };

        let difference = a_value - b_value;
        json!({
            "result": result,
            "a_value": a_value,
            "b_value": b_value,
            "difference": difference,
            "formatted_difference": counsel_core::format_gbp(difference),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_currency_strings() {
        let tool = CompareNumbersTool;
        let out = tool.execute(&json!({ "a": "£51,000", "b": "£50,000", "op": ">" }));
        assert_eq!(out["result"], true);
        assert_eq!(out["difference"], 1000.0);
    }

    #[test]
    fn rejects_unknown_operator() {
        let tool = CompareNumbersTool;
        let out = tool.execute(&json!({ "a": "10", "b": "20", "op": "~=" }));
        assert!(out.get("error").is_some());
    }

    #[test]
    fn rejects_unparseable_value() {
        let tool = CompareNumbersTool;
        let out = tool.execute(&json!({ "a": "n/a", "b": "20", "op": "<" }));
        assert!(out.get("error").is_some());
    }
}
