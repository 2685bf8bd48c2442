use crate::domain::{
    errors::DomainError, ChunkPayload, CollectionSpec, DistanceMetric, Embedding, ScoredPoint,
};
use async_trait::async_trait;

/// Persistent home of every stored point. A store handle is bound to one
/// collection and is shared across concurrent requests.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection when absent. An existing collection is never
    /// dropped or resized; a dimension mismatch is an error.
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> Result<(), DomainError>;

    /// Overwrite-by-id write of index-aligned points.
    async fn upsert(
        &self,
        ids: &[String],
        vectors: &[Embedding],
        payloads: &[ChunkPayload],
    ) -> Result<(), DomainError>;

    async fn search(&self, query: &Embedding, top_k: usize)
        -> Result<Vec<ScoredPoint>, DomainError>;

    async fn delete_by_source(&self, source_id: &str) -> Result<(), DomainError>;

    async fn health_check(&self) -> Result<(), DomainError>;

    fn collection(&self) -> &CollectionSpec;
}

pub(crate) fn check_dimension(
    spec: &CollectionSpec,
    vector: &Embedding,
) -> Result<(), DomainError> {
    if vector.dimension() != spec.dimension {
        return Err(DomainError::invalid_argument(format!(
            "vector has dimension {}, collection '{}' expects {}",
            vector.dimension(),
            spec.name,
            spec.dimension
        )));
    }
    Ok(())
}
