use serde_json::json;

use crate::tool::Tool;

/// Finds duplicates, near-equal values, and integer-multiple relationships
/// in a list of numbers (spec §4.6 `detect_patterns`).
pub struct DetectPatternsTool;

const NEAR_EQUAL_FRACTION: f64 = 0.05;

fn duplicates(numbers: &[f64]) -> Vec<serde_json::Value> {
    let mut found = Vec::new();
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if (numbers[i] - numbers[j]).abs() < f64::EPSILON {
                found.push(json!({ "indices": [i, j], "value": numbers[i] }));
            }
        }
    }
    found
}

fn near_equal(numbers: &[f64]) -> Vec<serde_json::Value> {
    let mut found = Vec::new();
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            let (a, b) = (numbers[i], numbers[j]);
            if a == 0.0 && b == 0.0 {
                continue;
            }
            let largest = a.abs().max(b.abs());
            if largest == 0.0 {
                continue;
            }
            if (a - b).abs() / largest <= NEAR_EQUAL_FRACTION && (a - b).abs() > f64::EPSILON {
                found.push(json!({ "indices": [i, j], "values": [a, b] }));
            }
        }
    }
    found
}

fn integer_multiples(numbers: &[f64]) -> Vec<serde_json::Value> {
    let mut found = Vec::new();
    for i in 0..numbers.len() {
        for j in 0..numbers.len() {
            if i == j {
                continue;
            }
            let (a, b) = (numbers[i], numbers[j]);
            if a <= 0.0 || b <= 0.0 || a <= b {
                continue;
            }
            let ratio = a / b;
            let rounded = ratio.round();
            if rounded >= 2.0 && (ratio - rounded).abs() < 1e-6 {
                found.push(json!({ "indices": [i, j], "multiple": rounded, "values": [a, b] }));
            }
        }
    }
    found
}

impl Tool for DetectPatternsTool {
    fn name(&self) -> &'static str {
        "detect_patterns"
    }

    fn description(&self) -> &'static str {
        "Detect duplicate values, near-equal values, and integer-multiple relations in a list of numbers."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "numbers": { "type": "array", "items": { "type": "number" } } },
            "required": ["numbers"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let Some(numbers) = args
            .get("numbers")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_f64()).collect::<Vec<_>>())
        else {
            return json!({ "error": "missing or invalid required argument 'numbers'" });
        };

        json!({
            "duplicates": duplicates(&numbers),
            "near_equal": near_equal(&numbers),
            "integer_multiples": integer_multiples(&numbers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_duplicates() {
        let tool = DetectPatternsTool;
        let out = tool.execute(&json!({ "numbers": [500.0, 500.0, 900.0] }));
        assert_eq!(out["duplicates"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn finds_near_equal_values() {
        let tool = DetectPatternsTool;
        let out = tool.execute(&json!({ "numbers": [1000.0, 1030.0] }));
        assert_eq!(out["near_equal"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn finds_integer_multiples() {
        let tool = DetectPatternsTool;
        let out = tool.execute(&json!({ "numbers": [300.0, 100.0] }));
        let multiples = out["integer_multiples"].as_array().unwrap();
        assert_eq!(multiples.len(), 1);
        assert_eq!(multiples[0]["multiple"], 3.0);
    }
}
