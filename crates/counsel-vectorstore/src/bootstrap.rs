use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, warn};

use counsel_core::{
    format_gbp, normalize_threshold_name, LlmClient, Message, Result, ThresholdCache,
    ThresholdEntry, VectorStore,
};

const MAX_TOKENS: u32 = 2048;
const DEFAULT_TOP_K: usize = 8;

const SYSTEM_PROMPT: &str = "You extract numerical limits, maximums, minimums, and fees from \
debt-advice source material. Respond with a JSON array of objects: \
{\"name\": string, \"amount\": number, \"unit\": \"gbp\"|\"usd\"|\"eur\"|\"percent\"|\"count\", \
\"source\": string}. Respond with nothing but the JSON array.";

#[derive(Debug, Deserialize)]
struct RawThreshold {
    name: String,
    amount: f64,
    #[serde(default)]
    source: String,
}

fn extract_json_array(text: &str) -> &str {
    let start = text.find('[');
    let end = text.rfind(']');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &text[s..=e],
        _ => text,
    }
}

/// Prefer the entry whose source filename contains the solution keyword
/// embedded in the threshold name (spec §4.7: "Duplicate names resolve to
/// the highest-confidence source").
fn higher_confidence(existing: &ThresholdEntry, candidate: &ThresholdEntry, name: &str) -> bool {
    let keyword = name.split('_').next().unwrap_or(name);
    let candidate_matches = candidate.source.to_lowercase().contains(keyword);
    let existing_matches = existing.source.to_lowercase().contains(keyword);
    candidate_matches && !existing_matches
}

/// Populate the threshold cache from a fixed vector-store query (spec
/// §4.7). Run exactly once at startup; the caller is responsible for the
/// once-only guard (spec §5: "subsequent bootstrap attempts are no-ops
/// protected by a startup flag").
#[instrument(skip(vector_store, llm))]
pub async fn bootstrap_threshold_cache(
    vector_store: &dyn VectorStore,
    llm: &dyn LlmClient,
    query: &str,
    min_entries: usize,
) -> Result<ThresholdCache> {
    let chunks = vector_store.similarity_search(query, DEFAULT_TOP_K).await?;

    if chunks.is_empty() {
        warn!("threshold cache bootstrap found no chunks for the bootstrap query");
        return Ok(ThresholdCache::empty());
    }

    let context = chunks
        .iter()
        .map(|c| format!("[Source: {}]\n{}", c.source, c.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = format!("{query}\n\nSource material:\n{context}");
    let response = llm.invoke(SYSTEM_PROMPT, &[Message::user(prompt)], MAX_TOKENS).await?;

    let raw: Vec<RawThreshold> = match serde_json::from_str(extract_json_array(&response)) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "could not parse threshold extraction response, cache will be empty");
            Vec::new()
        }
    };

    let mut entries: HashMap<String, ThresholdEntry> = HashMap::new();
    for item in raw {
        if !item.amount.is_finite() || item.amount < 0.0 {
            warn!(name = %item.name, amount = item.amount, "rejecting non-finite or negative threshold amount");
            continue;
        }

        let normalized = normalize_threshold_name(&item.name);
        let candidate = ThresholdEntry { amount: item.amount, formatted: format_gbp(item.amount), source: item.source };

        match entries.get(&normalized) {
            Some(existing) if !higher_confidence(existing, &candidate, &normalized) => {}
            _ => {
                entries.insert(normalized, candidate);
            }
        }
    }

    if entries.len() < min_entries {
        warn!(
            found = entries.len(),
            minimum = min_entries,
            "threshold cache bootstrap yielded fewer entries than configured minimum"
        );
    }

    Ok(ThresholdCache::new(entries))
}

/// Run the bootstrap exactly once, guarded by an atomic flag (spec §5).
/// Subsequent calls are no-ops that return the cache already built.
pub struct BootstrapGuard {
    started: std::sync::atomic::AtomicBool,
}

impl Default for BootstrapGuard {
    fn default() -> Self {
        Self { started: std::sync::atomic::AtomicBool::new(false) }
    }
}

impl BootstrapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time it is called, `false` on every
    /// subsequent call.
    pub fn try_start(&self) -> bool {
        self.started
            .compare_exchange(false, true, std::sync::atomic::Ordering::SeqCst, std::sync::atomic::Ordering::SeqCst)
            .is_ok()
    }
}

pub async fn bootstrap_once(
    guard: &BootstrapGuard,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmClient>,
    query: &str,
    min_entries: usize,
) -> Option<Result<ThresholdCache>> {
    if !guard.try_start() {
        return None;
    }
    Some(bootstrap_threshold_cache(vector_store.as_ref(), llm.as_ref(), query, min_entries).await)
}
