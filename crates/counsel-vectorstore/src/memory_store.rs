use async_trait::async_trait;

use counsel_core::{Chunk, Result, VectorStore};

/// In-memory `VectorStore` test double: naive substring/keyword overlap
/// scoring instead of a real embedding index. Good enough to drive
/// deterministic integration tests without a running Qdrant instance.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStore {
    chunks: Vec<Chunk>,
}

impl InMemoryVectorStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    fn score(query: &str, chunk: &Chunk) -> usize {
        let query_words: Vec<&str> = query.to_lowercase().split_whitespace().collect();
        let text_lower = chunk.text.to_lowercase();
        query_words.iter().filter(|w| text_lower.contains(*w)).count()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let mut scored: Vec<(usize, &Chunk)> =
            self.chunks.iter().map(|c| (Self::score(query, c), c)).filter(|(score, _)| *score > 0).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, c)| c.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ranks_chunks_by_keyword_overlap() {
        let store = InMemoryVectorStore::new(vec![
            Chunk::new("The DRO maximum debt limit is £50,000.", "dro.pdf", "c1"),
            Chunk::new("Bankruptcy has no maximum debt limit.", "bankruptcy.pdf", "c2"),
            Chunk::new("Unrelated content about savings accounts.", "other.pdf", "c3"),
        ]);
        let results = store.similarity_search("DRO maximum debt limit", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "c1");
    }

    #[tokio::test]
    async fn returns_empty_when_nothing_matches() {
        let store = InMemoryVectorStore::new(vec![Chunk::new("text", "source.pdf", "c1")]);
        let results = store.similarity_search("completely different query words", 4).await.unwrap();
        assert!(results.is_empty());
    }
}
