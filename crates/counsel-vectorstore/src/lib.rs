pub mod bootstrap;
pub mod embedder;
pub mod memory_store;
pub mod qdrant_store;

pub use bootstrap::{bootstrap_once, bootstrap_threshold_cache, BootstrapGuard};
pub use embedder::{Embedder, HashingEmbedder};
pub use memory_store::InMemoryVectorStore;
pub use qdrant_store::QdrantVectorStore;
