use async_trait::async_trait;

use crate::chunk::Chunk;
use crate::error::Result;

/// Capability interface for similarity search over the manual corpus (spec
/// §9: "Plug-in LLM/Vector store"). The core never depends on a concrete
/// provider; `counsel-vectorstore` supplies the Qdrant-backed implementation.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>>;
}
