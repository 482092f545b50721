use std::sync::Arc;

use tracing::{instrument, warn};

use counsel_core::{AgentState, Chunk, Result, ThresholdCache, VectorStore};

/// Runs each suggested search against the vector store, merges and
/// deduplicates the results by `chunk_id`, and annotates chunks whose text
/// mentions a cached threshold's surface form.
pub struct RetrieveNode {
    vector_store: Arc<dyn VectorStore>,
    thresholds: ThresholdCache,
    top_k: usize,
}

impl RetrieveNode {
    pub fn new(vector_store: Arc<dyn VectorStore>, thresholds: ThresholdCache, top_k: usize) -> Self {
        Self { vector_store, thresholds, top_k }
    }

    #[instrument(skip(self, state))]
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState> {
        let queries: Vec<String> = state.suggested_searches.iter().take(3).cloned().collect();
        let mut added = 0usize;
        let mut failures = 0usize;

        for query in &queries {
            match self.vector_store.similarity_search(query, self.top_k).await {
                Ok(chunks) => {
                    for mut chunk in chunks {
                        annotate_numeric_hint(&mut chunk, &self.thresholds);
                        if state.push_chunk_deduped(chunk) {
                            added += 1;
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(query = %query, error = %e, "retrieval query failed, skipping");
                }
            }
        }

        if !queries.is_empty() && failures == queries.len() {
            warn!("all retrieval queries failed, proceeding with empty context");
        }

        state.push_step(
            "retrieve",
            "ran similarity search for each suggested query and merged results",
            format!("{added} new chunk(s) from {} quer{}", queries.len(), if queries.len() == 1 { "y" } else { "ies" }),
        );

        Ok(state)
    }
}

/// Tags a chunk with the name of the first cached threshold whose amount
/// appears as a monetary literal in the chunk's text (spec §4.3), matching
/// on numeric value rather than on `format_gbp`'s `.00`-suffixed rendering
/// or a snake-case-token scan, neither of which the source text need match.
fn annotate_numeric_hint(chunk: &mut Chunk, thresholds: &ThresholdCache) {
    let numbers = counsel_tools::numeric::extract_numbers(&chunk.text);
    if numbers.is_empty() {
        return;
    }
    for (name, entry) in thresholds.iter() {
        if numbers.iter().any(|&n| (n - entry.amount).abs() < 0.01) {
            chunk.numeric_rule_hint = Some(name.clone());
            break;
        }
    }
}
