use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{
    point_id,
    ports::{check_dimension, EmbeddingService, VectorStore},
    ChunkPayload, Chunker, Document, DomainError, IngestReceipt,
};

/// Chunk → embed → upsert, with point ids derived from `(source_id, index)`.
pub struct IngestionPipeline {
    chunker: Chunker,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    replace_existing: bool,
}

impl IngestionPipeline {
    pub fn new(
        chunker: Chunker,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker,
            embedding,
            vector_store,
            replace_existing: false,
        }
    }

    /// When set, every existing point of the source is deleted before the
    /// new chunks are written. Otherwise a shrunk document leaves its old
    /// trailing points in place.
    pub fn with_replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    #[instrument(skip(self, document), fields(source_id = %document.source_id, chunk_count))]
    pub async fn ingest(&self, document: &Document) -> Result<IngestReceipt, DomainError> {
        let source_id = document.source_id.as_str();
        if source_id.trim().is_empty() {
            return Err(DomainError::invalid_argument("source_id must not be empty"));
        }

        let chunks = self.chunker.chunk(&document.text);
        tracing::Span::current().record("chunk_count", chunks.len());

        let vectors = if chunks.is_empty() {
            Vec::new()
        } else {
            self.embedding.embed_batch(&chunks).await?
        };
        if vectors.len() != chunks.len() {
            return Err(DomainError::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        for vector in &vectors {
            check_dimension(self.vector_store.collection(), vector)?;
        }

        let ids: Vec<String> = (0..chunks.len()).map(|i| point_id(source_id, i)).collect();
        let payloads: Vec<ChunkPayload> = chunks
            .into_iter()
            .map(|text| ChunkPayload::new(source_id, text))
            .collect();

        // Old points go only once the replacement batch is ready to write.
        if self.replace_existing {
            self.vector_store.delete_by_source(source_id).await?;
        }

        if ids.is_empty() {
            info!("document produced no chunks");
        } else {
            self.vector_store.upsert(&ids, &vectors, &payloads).await?;
            info!(chunk_count = ids.len(), "ingested document");
        }

        Ok(IngestReceipt {
            ingested: source_id.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn remove_source(&self, source_id: &str) -> Result<(), DomainError> {
        self.vector_store.delete_by_source(source_id).await
    }
}
