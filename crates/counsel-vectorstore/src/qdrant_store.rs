use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{SearchPointsBuilder, Value as QdrantValue};
use qdrant_client::Qdrant;
use tracing::{info, warn};

use counsel_core::{Chunk, CounselError, Result, VectorStore};

use crate::embedder::Embedder;

const QDRANT_TIMEOUT_SECS: u64 = 5;

/// `VectorStore` backed by a Qdrant collection of embedded chunks (spec §9:
/// "Plug-in LLM/Vector store" — this is the concrete implementation behind
/// the `VectorStore` trait defined in `counsel-core`).
pub struct QdrantVectorStore<E: Embedder> {
    client: Option<Qdrant>,
    collection: String,
    embedder: Arc<E>,
}

impl<E: Embedder> QdrantVectorStore<E> {
    pub async fn new(url: &str, collection: impl Into<String>, embedder: Arc<E>) -> Self {
        let collection = collection.into();
        match Qdrant::from_url(url).build() {
            Ok(client) => {
                info!(url, "connected to Qdrant");
                Self { client: Some(client), collection, embedder }
            }
            Err(e) => {
                warn!(url, error = %e, "failed to connect to Qdrant — running in degraded mode");
                Self { client: None, collection, embedder }
            }
        }
    }

    fn client(&self) -> Result<&Qdrant> {
        self.client.as_ref().ok_or_else(|| CounselError::Retrieval("Qdrant not connected".into()))
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

async fn timed<T, F: Future<Output = T>>(op: F) -> std::result::Result<T, CounselError> {
    tokio::time::timeout(Duration::from_secs(QDRANT_TIMEOUT_SECS), op)
        .await
        .map_err(|_| CounselError::Retrieval(format!("Qdrant operation timed out after {QDRANT_TIMEOUT_SECS}s")))
}

fn payload_string(payload: &std::collections::HashMap<String, QdrantValue>, key: &str) -> String {
    payload
        .get(key)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[async_trait]
impl<E: Embedder> VectorStore for QdrantVectorStore<E> {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let client = self.client()?;
        let query_vector = self.embedder.embed(query).await?;

        let search = SearchPointsBuilder::new(&self.collection, query_vector, k as u64).with_payload(true);

        let response = timed(client.search_points(search)).await??;

        let chunks = response
            .result
            .into_iter()
            .map(|point| {
                let chunk_id = point
                    .id
                    .and_then(|id| id.point_id_options)
                    .map(|opts| format!("{opts:?}"))
                    .unwrap_or_default();
                Chunk::new(
                    payload_string(&point.payload, "text"),
                    payload_string(&point.payload, "source"),
                    chunk_id,
                )
            })
            .collect();

        Ok(chunks)
    }
}

impl From<qdrant_client::QdrantError> for CounselError {
    fn from(e: qdrant_client::QdrantError) -> Self {
        CounselError::Retrieval(e.to_string())
    }
}
