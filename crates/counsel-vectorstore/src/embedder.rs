use async_trait::async_trait;

use counsel_core::Result;

const VECTOR_DIM: usize = 128;

/// Converts text into the vector Qdrant indexes on. The core spec treats
/// `VectorStore::similarity_search` as a black box over text; this is the
/// piece a real deployment plugs in underneath it (a hosted embeddings API,
/// a local model, etc).
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Deterministic, dependency-free embedder used for local development and
/// tests: hashes overlapping word shingles into a fixed-size bag-of-words
/// vector. Captures enough lexical overlap for `similarity_search` to
/// round-trip in tests; not a substitute for a real embeddings model.
pub struct HashingEmbedder;

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0f32; VECTOR_DIM];
        for word in text.to_lowercase().split_whitespace() {
            let bucket = fnv1a(word) as usize % VECTOR_DIM;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
