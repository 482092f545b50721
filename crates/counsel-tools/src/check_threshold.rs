use serde_json::json;

use counsel_core::{format_gbp, normalize_threshold_name, ThresholdCache};

use crate::tool::Tool;

/// The critical tool (spec §4.6): decides whether a client value qualifies
/// against a named threshold. Holds its own cache snapshot, constructed
/// once at registry build time, rather than threading the cache through
/// every call.
///
/// MUST NOT fabricate a threshold value — an absent entry is reported as
/// `needs_lookup`, never guessed.
pub struct CheckThresholdTool {
    cache: ThresholdCache,
}

impl CheckThresholdTool {
    pub fn new(cache: ThresholdCache) -> Self {
        Self { cache }
    }
}

enum Polarity {
    UpperBound,
    LowerBound,
}

fn detect_polarity(threshold_name: &str) -> Polarity {
    let lower = threshold_name.to_lowercase();
    if lower.contains("min") {
        Polarity::LowerBound
    } else if lower.contains("max") || lower.contains("limit") {
        Polarity::UpperBound
    } else {
        Polarity::UpperBound
    }
}

fn advice_for(qualifies: bool, polarity: &Polarity, threshold_name: &str, difference: f64) -> String {
    match (qualifies, polarity) {
        (true, Polarity::UpperBound) => {
            format!("within {threshold_name} by {}", format_gbp(difference.abs()))
        }
        (true, Polarity::LowerBound) => {
            format!("meets {threshold_name} with {} to spare", format_gbp(difference.abs()))
        }
        (false, Polarity::UpperBound) => {
            format!("exceeds {threshold_name} by {}", format_gbp(difference.abs()))
        }
        (false, Polarity::LowerBound) => {
            format!("falls short of {threshold_name} by {}", format_gbp(difference.abs()))
        }
    }
}

impl Tool for CheckThresholdTool {
    fn name(&self) -> &'static str {
        "check_threshold"
    }

    fn description(&self) -> &'static str {
        "Check a client amount against a named threshold, looking it up from the threshold cache if no explicit value is given."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "amount": { "type": "number" },
                "threshold_name": { "type": "string" },
                "threshold_value": { "type": "number" }
            },
            "required": ["amount", "threshold_name"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let Some(amount) = args.get("amount").and_then(|v| v.as_f64()) else {
            return json!({ "error": "missing required argument 'amount'" });
        };
        let Some(threshold_name) = args.get("threshold_name").and_then(|v| v.as_str()) else {
            return json!({ "error": "missing required argument 'threshold_name'" });
        };

        let explicit_value = args.get("threshold_value").and_then(|v| v.as_f64());
        let normalized = normalize_threshold_name(threshold_name);

        let (threshold_value, source) = match explicit_value {
            Some(value) => (value, "caller-provided".to_string()),
            None => match self.cache.get(&normalized) {
                Some(entry) => (entry.amount, entry.source.clone()),
                None => {
                    return json!({
                        "status": "needs_lookup",
                        "message": format!(
                            "no threshold named '{normalized}' is cached; do not fabricate a value"
                        ),
                    });
                }
            },
        };

        let polarity = detect_polarity(threshold_name);
        let qualifies = match polarity {
            Polarity::UpperBound => amount <= threshold_value,
            Polarity::LowerBound => amount >= threshold_value,
        };
        let difference = amount - threshold_value;
        let percentage = if threshold_value.abs() > f64::EPSILON {
            (amount / threshold_value) * 100.0
        } else {
            0.0
        };
        let headroom = match polarity {
            Polarity::UpperBound => threshold_value - amount,
            Polarity::LowerBound => amount - threshold_value,
        };

        json!({
            "qualifies": qualifies,
            "amount": amount,
            "threshold": threshold_value,
            "difference": difference,
            "percentage": percentage,
            "headroom": headroom,
            "advice": advice_for(qualifies, &polarity, threshold_name, difference),
            "formatted_amount": format_gbp(amount),
            "formatted_threshold": format_gbp(threshold_value),
            "source": source,
        })
    }
}
