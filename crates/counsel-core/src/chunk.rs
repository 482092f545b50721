use serde::{Deserialize, Serialize};

/// A passage of manual text returned by a vector-similarity search (spec
/// §3, glossary "Chunk").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub chunk_id: String,
    pub metadata: serde_json::Value,
    /// Set by the retrieval node (§4.3) when the chunk text contains a
    /// monetary literal matching a threshold name already in the cache.
    #[serde(default)]
    pub numeric_rule_hint: Option<String>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, chunk_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            chunk_id: chunk_id.into(),
            metadata: serde_json::Value::Object(serde_json::Map::new()),
            numeric_rule_hint: None,
        }
    }
}
