use once_cell::sync::Lazy;
use regex::Regex;

/// Matches currency/number literals: `£50,000`, `$1,234.56`, `75%`, `3000`.
pub static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[£$€]?\s?(-?\d[\d,]*(?:\.\d+)?)\s?%?").unwrap()
});

/// Parse a currency-ish string (`"£51,000"`, `"50000"`, `"1,234.56"`) into
/// its numeric value, stripping symbol and thousands separators.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Extract every numeric literal found in free text, in order of
/// appearance, as plain `f64` values (spec §4.6 `extract_numbers_from_text`).
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let digits = caps.get(1)?.as_str();
            parse_currency(digits)
        })
        .collect()
}
