pub mod calculate;
pub mod check_threshold;
pub mod compare_numbers;
pub mod detect_patterns;
pub mod extract_numbers_from_text;
pub mod find_convenient_sums;
pub mod numeric;
pub mod sum_numbers;
pub mod tool;

use std::collections::HashMap;
use std::sync::Arc;

use counsel_core::ThresholdCache;

pub use calculate::CalculateTool;
pub use check_threshold::CheckThresholdTool;
pub use compare_numbers::CompareNumbersTool;
pub use detect_patterns::DetectPatternsTool;
pub use extract_numbers_from_text::ExtractNumbersFromTextTool;
pub use find_convenient_sums::FindConvenientSumsTool;
pub use sum_numbers::SumNumbersTool;
pub use tool::Tool;

/// Builds the full set of synthesis tools (spec §4.6), keyed by name.
/// `check_threshold` is seeded with a snapshot of the cache at build time;
/// the other tools are stateless.
pub fn tool_registry(threshold_cache: ThresholdCache) -> HashMap<String, Arc<dyn Tool>> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CalculateTool),
        Arc::new(CompareNumbersTool),
        Arc::new(SumNumbersTool),
        Arc::new(CheckThresholdTool::new(threshold_cache)),
        Arc::new(DetectPatternsTool),
        Arc::new(FindConvenientSumsTool),
        Arc::new(ExtractNumbersFromTextTool),
    ];

    tools.into_iter().map(|tool| (tool.name().to_string(), tool)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_all_seven_tools() {
        let registry = tool_registry(ThresholdCache::empty());
        assert_eq!(registry.len(), 7);
        for name in [
            "calculate",
            "compare_numbers",
            "sum_numbers",
            "check_threshold",
            "detect_patterns",
            "find_convenient_sums",
            "extract_numbers_from_text",
        ] {
            assert!(registry.contains_key(name), "missing tool: {name}");
        }
    }
}
