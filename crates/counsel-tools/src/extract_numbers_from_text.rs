use serde_json::json;

use crate::numeric::extract_numbers;
use crate::tool::Tool;

/// Regex-based numeric extractor over free text (spec §4.6
/// `extract_numbers_from_text`).
pub struct ExtractNumbersFromTextTool;

impl Tool for ExtractNumbersFromTextTool {
    fn name(&self) -> &'static str {
        "extract_numbers_from_text"
    }

    fn description(&self) -> &'static str {
        "Extract every numeric literal from free text and summarize it."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let Some(text) = args.get("text").and_then(|v| v.as_str()) else {
            return json!({ "error": "missing required argument 'text'" });
        };

        let numbers = extract_numbers(text);
        if numbers.is_empty() {
            return json!({ "numbers": [], "count": 0, "sum": 0.0, "average": 0.0, "min": null, "max": null });
        }

        let count = numbers.len();
        let sum: f64 = numbers.iter().sum();
        let average = sum / count as f64;
        let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        json!({
            "numbers": numbers,
            "count": count,
            "sum": sum,
            "average": average,
            "min": min,
            "max": max,
        })
    }
}
