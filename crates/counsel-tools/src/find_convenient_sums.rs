use serde_json::json;

use crate::tool::Tool;

const ROUND_STEPS: [f64; 5] = [100.0, 500.0, 1_000.0, 5_000.0, 10_000.0];

/// Enumerates pairs, triples, and the total sum of a list of numbers,
/// flagging subsets that land suspiciously close to a round figure (spec
/// §4.6 `find_convenient_sums`). A structuring red flag, not proof of
/// anything on its own.
pub struct FindConvenientSumsTool;

/// Nearest round figure to `sum`, checked against the nearest multiple of
/// each step in `ROUND_STEPS` rather than five fixed absolute figures —
/// £4,000 must be caught as readily as £5,000 or £10,000.
fn nearest_round_target(sum: f64, tolerance: f64) -> Option<(f64, f64)> {
    ROUND_STEPS
        .iter()
        .map(|&step| {
            let candidate = (sum / step).round() * step;
            (candidate, (sum - candidate).abs())
        })
        .filter(|&(candidate, gap)| candidate > 0.0 && gap <= tolerance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.partial_cmp(&b.0).unwrap()))
}

fn subset_entry(indices: &[usize], numbers: &[f64], tolerance: f64) -> Option<serde_json::Value> {
    let sum: f64 = indices.iter().map(|&i| numbers[i]).sum();
    let (target, gap) = nearest_round_target(sum, tolerance)?;
    Some(json!({
        "indices": indices,
        "values": indices.iter().map(|&i| numbers[i]).collect::<Vec<_>>(),
        "sum": sum,
        "nearest_round_number": target,
        "gap": gap,
        "formatted_sum": counsel_core::format_gbp(sum),
    }))
}

impl Tool for FindConvenientSumsTool {
    fn name(&self) -> &'static str {
        "find_convenient_sums"
    }

    fn description(&self) -> &'static str {
        "Find pairs, triples, or the total sum of a list of numbers that land near a round figure."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "numbers": { "type": "array", "items": { "type": "number" } },
                "target_tolerance": { "type": "number" }
            },
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
        if numbers.len() < 2 {
            return json!({ "error": "'numbers' must contain at least two values" });
        }
        let tolerance = args.get("target_tolerance").and_then(|v| v.as_f64()).unwrap_or(50.0);

        let mut matches = Vec::new();

        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                if let Some(entry) = subset_entry(&[i, j], &numbers, tolerance) {
                    matches.push(entry);
                }
            }
        }

        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                for k in (j + 1)..numbers.len() {
                    if let Some(entry) = subset_entry(&[i, j, k], &numbers, tolerance) {
                        matches.push(entry);
                    }
                }
            }
        }

        let all_indices: Vec<usize> = (0..numbers.len()).collect();
        if let Some(entry) = subset_entry(&all_indices, &numbers, tolerance) {
            matches.push(entry);
        }

        json!({
            "matches": matches,
            "match_count": matches.len(),
            "target_tolerance": tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_pair_summing_to_round_number() {
        let tool = FindConvenientSumsTool;
        let out = tool.execute(&json!({ "numbers": [1500.0, 2500.0, 6020.0], "target_tolerance": 50.0 }));
        let matches = out["matches"].as_array().unwrap();
        assert!(matches.iter().any(|m| m["nearest_round_number"] == 4000.0));
    }

    #[test]
    fn flags_total_summing_to_round_number() {
        let tool = FindConvenientSumsTool;
        let out = tool.execute(&json!({ "numbers": [4000.0, 6000.0], "target_tolerance": 50.0 }));
        let matches = out["matches"].as_array().unwrap();
        assert!(matches.iter().any(|m| m["nearest_round_number"] == 10_000.0));
    }

    #[test]
    fn rejects_too_few_numbers() {
        let tool = FindConvenientSumsTool;
        let out = tool.execute(&json!({ "numbers": [100.0] }));
        assert!(out.get("error").is_some());
    }

    #[test]
    fn flags_debt_list_pair_and_total_from_suspicious_pattern_scenario() {
        let tool = FindConvenientSumsTool;
        let out = tool.execute(&json!({ "numbers": [2450.0, 1550.0, 1000.0, 5000.0], "target_tolerance": 50.0 }));
        let matches = out["matches"].as_array().unwrap();
        assert!(matches.iter().any(|m| m["nearest_round_number"] == 4000.0), "expected a £4,000 pair match");
        assert!(matches.iter().any(|m| m["nearest_round_number"] == 10_000.0), "expected a £10,000 total match");
    }
}
