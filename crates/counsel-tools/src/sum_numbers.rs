use serde_json::json;

use crate::tool::Tool;

/// Summary statistics over a list of numbers (spec §4.6 `sum_numbers`).
pub struct SumNumbersTool;

fn numbers_from_args(args: &serde_json::Value) -> Option<Vec<f64>> {
    args.get("list")
        .or_else(|| args.get("numbers"))?
        .as_array()?
        .iter()
        .map(|v| v.as_f64())
        .collect()
}

impl Tool for SumNumbersTool {
    fn name(&self) -> &'static str {
        "sum_numbers"
    }

    fn description(&self) -> &'static str {
        "Sum, average, min, max and count over a list of numbers."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "list": { "type": "array", "items": { "type": "number" } } },
            "required": ["list"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let Some(numbers) = numbers_from_args(args) else {
            return json!({ "error": "missing or invalid required argument 'list'" });
        };
        if numbers.is_empty() {
            return json!({ "error": "'list' must contain at least one number" });
        }

        let count = numbers.len();
        let sum: f64 = numbers.iter().sum();
        let average = sum / count as f64;
        let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        json!({
            "sum": sum,
            "average": average,
            "count": count,
            "min": min,
            "max": max,
            "formatted_sum": counsel_core::format_gbp(sum),
            "formatted_average": counsel_core::format_gbp(average),
        })
    }
}
