use once_cell::sync::Lazy;
use regex::Regex;

static CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CONFIDENCE(?:_LEVEL)?:\s*(HIGH|MEDIUM|LOW|[0-9.]+)").unwrap());

const HEDGING_UNCERTAIN: &[&str] = &["may", "possibly", "might", "perhaps", "could be"];
const HEDGING_LOW: &[&str] = &["insufficient", "unclear", "cannot determine", "not enough information"];

/// Extract a confidence value and its accompanying reason from free-form
/// synthesis output (spec §4.5). Structured `CONFIDENCE: <val>` text is
/// preferred; absent that, hedging language is used as a coarse signal;
/// absent that too, the default is `0.6`.
pub fn extract_confidence(text: &str) -> (f64, String) {
    if let Some(caps) = CONFIDENCE_RE.captures(text) {
        let raw = caps.get(1).unwrap().as_str();
        let value = match raw.to_uppercase().as_str() {
            "HIGH" => 0.9,
            "MEDIUM" => 0.6,
            "LOW" => 0.3,
            other => other.parse::<f64>().unwrap_or(0.6).clamp(0.0, 1.0),
        };
        let reason = text[caps.get(0).unwrap().end()..]
            .trim_start_matches([' ', '-', '—', ':'])
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return (value, reason);
    }

    let lower = text.to_lowercase();
    if HEDGING_LOW.iter().any(|w| lower.contains(w)) {
        return (0.3, "hedging language suggests the source material is insufficient".to_string());
    }
    if HEDGING_UNCERTAIN.iter().any(|w| lower.contains(w)) {
        return (0.5, "hedging language suggests some uncertainty".to_string());
    }

    (0.6, "no explicit confidence signal found".to_string())
}
