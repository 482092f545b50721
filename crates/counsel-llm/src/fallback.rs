use once_cell::sync::Lazy;
use regex::Regex;

use counsel_core::ToolInvocation;

static TOOL_CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"TOOL_CALL:\s*(\{.*\})").unwrap());

/// Regex-based `TOOL_CALL: {json}` fallback protocol (spec §4.5, §9) for
/// providers without native tool-calling. Scans every line so a model that
/// emits several tool calls in one turn is still fully decoded.
pub fn parse_tool_call_fallback(text: &str) -> Vec<ToolInvocation> {
    text.lines()
        .filter_map(|line| {
            let caps = TOOL_CALL_RE.captures(line)?;
            let json = caps.get(1)?.as_str();
            let value: serde_json::Value = serde_json::from_str(json).ok()?;
            let name = value.get("tool").or_else(|| value.get("name"))?.as_str()?.to_string();
            let args = value.get("args").or_else(|| value.get("arguments")).cloned().unwrap_or(serde_json::json!({}));
            Some(ToolInvocation { name, args })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_tool_call() {
        let text = r#"Let me check that.
TOOL_CALL: {"tool": "check_threshold", "args": {"amount": 51000, "threshold_name": "dro_maximum_debt"}}"#;
        let calls = parse_tool_call_fallback(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "check_threshold");
    }

    #[test]
    fn parses_multiple_tool_calls_across_lines() {
        let text = "TOOL_CALL: {\"tool\": \"calculate\", \"args\": {\"expression\": \"1+1\"}}\nTOOL_CALL: {\"tool\": \"sum_numbers\", \"args\": {\"list\": [1,2]}}";
        let calls = parse_tool_call_fallback(text);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn returns_empty_when_no_tool_call_present() {
        assert!(parse_tool_call_fallback("just a plain answer").is_empty());
    }
}
