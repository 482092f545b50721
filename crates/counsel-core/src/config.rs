use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-role near-miss tolerance, expressed as a fraction of the threshold
/// (spec §4.8: "4% of threshold for debts, 10% for income, 10% for assets").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceDefaults(pub HashMap<String, f64>);

impl Default for ToleranceDefaults {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert("debt".to_string(), 0.04);
        map.insert("income".to_string(), 0.10);
        map.insert("assets".to_string(), 0.10);
        Self(map)
    }
}

impl ToleranceDefaults {
    pub fn fraction_for(&self, role: &str) -> f64 {
        self.0.get(role).copied().unwrap_or(0.05)
    }
}

/// Runtime configuration recognized by the engine (spec §6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub qdrant_url: String,
    pub qdrant_collection: String,

    pub default_top_k: usize,
    pub max_tool_iterations: u32,
    pub query_timeout_ms: u64,
    pub llm_timeout_ms: u64,
    pub symbolic_enabled: bool,
    pub cache_bootstrap_query: String,
    pub cache_bootstrap_min_entries: usize,
    pub tolerance_defaults: ToleranceDefaults,
}

const DEFAULT_BOOTSTRAP_QUERY: &str =
    "List all numerical limits, maximums, minimums, thresholds, and fees for debt solutions.";

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".into()),
            qdrant_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6334".into()),
            qdrant_collection: std::env::var("QDRANT_COLLECTION")
                .unwrap_or_else(|_| "debt_advice_manuals".into()),
            default_top_k: std::env::var("DEFAULT_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            max_tool_iterations: std::env::var("MAX_TOOL_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            query_timeout_ms: std::env::var("QUERY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            llm_timeout_ms: std::env::var("LLM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20_000),
            symbolic_enabled: std::env::var("SYMBOLIC_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cache_bootstrap_query: std::env::var("CACHE_BOOTSTRAP_QUERY")
                .unwrap_or_else(|_| DEFAULT_BOOTSTRAP_QUERY.into()),
            cache_bootstrap_min_entries: std::env::var("CACHE_BOOTSTRAP_MIN_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            tolerance_defaults: ToleranceDefaults::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            anthropic_model: "claude-sonnet-4-5-20250929".into(),
            qdrant_url: "http://localhost:6334".into(),
            qdrant_collection: "debt_advice_manuals".into(),
            default_top_k: 4,
            max_tool_iterations: 3,
            query_timeout_ms: 60_000,
            llm_timeout_ms: 20_000,
            symbolic_enabled: true,
            cache_bootstrap_query: DEFAULT_BOOTSTRAP_QUERY.into(),
            cache_bootstrap_min_entries: 3,
            tolerance_defaults: ToleranceDefaults::default(),
        }
    }
}
