use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single entry in the threshold cache (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdEntry {
    pub amount: f64,
    pub formatted: String,
    pub source: String,
}

/// In-memory mapping of normalized threshold name to its limit (spec §3).
/// Populated once at startup by the bootstrap job in `counsel-vectorstore`
/// and read-only for the remainder of the process lifetime — an `Arc`
/// snapshot, not a lock, since nothing ever mutates it after bootstrap.
#[derive(Debug, Clone, Default)]
pub struct ThresholdCache(Arc<HashMap<String, ThresholdEntry>>);

impl ThresholdCache {
    pub fn new(entries: HashMap<String, ThresholdEntry>) -> Self {
        Self(Arc::new(entries))
    }

    pub fn empty() -> Self {
        Self(Arc::new(HashMap::new()))
    }

    pub fn get(&self, normalized_name: &str) -> Option<&ThresholdEntry> {
        self.0.get(normalized_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ThresholdEntry)> {
        self.0.iter()
    }
}

/// Normalize a threshold name into lowercase snake_case, the cache's key
/// shape (spec §3: "normalized threshold name (lowercase snake-case, e.g.
/// `dro_maximum_debt`)").
pub fn normalize_threshold_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !out.is_empty() {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Format a GBP amount as `£X,XXX.XX` (spec §4.6).
pub fn format_gbp(amount: f64) -> String {
    let negative = amount < 0.0;
    let amount = amount.abs();
    let cents = (amount * 100.0).round() as i64;
    let pounds = cents / 100;
    let pence = cents % 100;

    let mut grouped = String::new();
    let digits = pounds.to_string();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    format!("{}£{}.{:02}", if negative { "-" } else { "" }, grouped, pence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_mixed_case_and_spacing() {
        assert_eq!(normalize_threshold_name("DRO Maximum Debt"), "dro_maximum_debt");
        assert_eq!(normalize_threshold_name("IVA  minimum-debt!!"), "iva_minimum_debt");
    }

    #[test]
    fn formats_gbp_with_thousands_separators() {
        assert_eq!(format_gbp(50000.0), "£50,000.00");
        assert_eq!(format_gbp(1234.5), "£1,234.50");
        assert_eq!(format_gbp(75.0), "£75.00");
        assert_eq!(format_gbp(-1000.0), "-£1,000.00");
    }
}
