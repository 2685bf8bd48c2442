mod in_memory;
mod qdrant;

use std::sync::Arc;

use tracing::info;

use crate::domain::{ports::VectorStore, CollectionSpec, DomainError};
use crate::infrastructure::config::{VectorStoreBackend, VectorStoreConfig};

pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantVectorStore;

/// Opens the configured backend bound to its collection, creating the
/// collection when it does not exist yet.
pub async fn build_vector_store(
    config: &VectorStoreConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorStore>, DomainError> {
    let store: Arc<dyn VectorStore> = match config.backend {
        VectorStoreBackend::Qdrant => {
            Arc::new(QdrantVectorStore::connect(config, dimension).await?)
        }
        VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new(CollectionSpec::new(
            &config.collection,
            dimension,
            config.distance,
        ))),
    };

    info!(
        backend = ?config.backend,
        collection = %config.collection,
        dimension,
        "vector store ready"
    );
    Ok(store)
}
